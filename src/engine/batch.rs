//! Batch remapping of several MIDI files
//!
//! Output paths come from a name template. Existing outputs are skipped
//! unless overwriting is enabled, and one failing file does not stop the
//! rest of the batch.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, error, info};

use super::midi::{default_output_path, remap_file, FileOptions, FileSummary};
use super::{Remapper, UnmappedReport};

/// Placeholders understood by output templates
pub const PLACEHOLDERS: [&str; 3] = ["{filename}", "{ext}", "{input_dir}"];

/// Reject templates that use an unknown `{...}` placeholder
pub fn check_template(template: &str) -> Result<()> {
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            bail!("Unclosed placeholder in output template: {}", template);
        };
        let placeholder = &rest[start..start + len + 1];
        if !PLACEHOLDERS.contains(&placeholder) {
            bail!(
                "Unknown placeholder {} in output template (expected one of {})",
                placeholder,
                PLACEHOLDERS.join(", ")
            );
        }
        rest = &rest[start + len + 1..];
    }
    Ok(())
}

fn has_placeholder(template: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| template.contains(p))
}

fn is_midi_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
}

/// Decides where each remapped file is written
///
/// The template is read one of three ways:
/// - with placeholders, it is filled in per input file; a relative result
///   lands in the output directory, or next to the input
/// - without placeholders and ending in `.mid`/`.midi`, it is a single file
/// - anything else is a directory receiving `<stem><suffix><ext>`
///
/// No template gives `<stem><suffix><ext>` in the output directory, or next
/// to the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    template: Option<String>,
    suffix: String,
    output_dir: Option<PathBuf>,
}

impl OutputNaming {
    pub fn new(template: Option<String>, suffix: impl Into<String>) -> Result<Self> {
        let template = template
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(t) = &template {
            check_template(t)?;
        }
        Ok(Self {
            template,
            suffix: suffix.into(),
            output_dir: None,
        })
    }

    /// Put relative outputs under `dir` (builder pattern)
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Output path for one input file
    pub fn output_for(&self, input: &Path) -> PathBuf {
        let Some(template) = &self.template else {
            return match &self.output_dir {
                Some(dir) => self.suffixed_in(dir, input),
                None => default_output_path(input, &self.suffix),
            };
        };

        if has_placeholder(template) {
            let filled = PathBuf::from(fill(template, input));
            if filled.is_absolute() || template.contains("{input_dir}") {
                return filled;
            }
            return match &self.output_dir {
                Some(dir) => dir.join(filled),
                None => input.with_file_name(filled),
            };
        }

        let candidate = self.under_output_dir(Path::new(template));
        if is_midi_path(&candidate) {
            candidate
        } else {
            self.suffixed_in(&candidate, input)
        }
    }

    fn under_output_dir(&self, path: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn suffixed_in(&self, dir: &Path, input: &Path) -> PathBuf {
        let name = default_output_path(input, &self.suffix);
        match name.file_name() {
            Some(file_name) => dir.join(file_name),
            None => dir.to_path_buf(),
        }
    }
}

fn fill(template: &str, input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| ".mid".to_string());
    let input_dir = match input.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    };
    template
        .replace("{filename}", &stem)
        .replace("{ext}", &ext)
        .replace("{input_dir}", &input_dir)
}

/// Settings for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub naming: OutputNaming,
    pub file: FileOptions,
    /// Replace outputs that already exist instead of skipping them
    pub overwrite: bool,
}

/// What happened to one input file
#[derive(Debug)]
pub enum FileOutcome {
    Remapped(FileSummary),
    /// The output already existed and overwriting was off
    Skipped,
    Failed(anyhow::Error),
}

#[derive(Debug)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: FileOutcome,
}

/// Per-file results plus the unmapped notes of the whole batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub entries: Vec<BatchEntry>,
    pub report: UnmappedReport,
}

impl BatchSummary {
    pub fn remapped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Remapped(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

fn remap_one(
    input: &Path,
    output: &Path,
    remapper: &Remapper,
    options: &BatchOptions,
    planned: &mut BTreeSet<PathBuf>,
) -> Result<FileOutcome> {
    if output == input {
        bail!("output path is the input file itself: {}", output.display());
    }
    if !planned.insert(output.to_path_buf()) {
        bail!("output path already used by another input: {}", output.display());
    }
    if output.exists() && !options.overwrite {
        info!(output = %output.display(), "output exists, skipping");
        return Ok(FileOutcome::Skipped);
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }

    let summary = remap_file(input, output, remapper, options.file)?;
    Ok(FileOutcome::Remapped(summary))
}

/// Remap every input file, continuing past failures
pub fn remap_batch(inputs: &[PathBuf], remapper: &Remapper, options: &BatchOptions) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut planned = BTreeSet::new();

    for input in inputs {
        let output = options.naming.output_for(input);
        debug!(input = %input.display(), output = %output.display(), "remapping");

        let outcome = remap_one(input, &output, remapper, options, &mut planned)
            .unwrap_or_else(|e| {
                error!(input = %input.display(), "{:#}", e);
                FileOutcome::Failed(e)
            });
        if let FileOutcome::Remapped(file) = &outcome {
            summary.report.merge(&file.report);
        }
        summary.entries.push(BatchEntry {
            input: input.clone(),
            output,
            outcome,
        });
    }

    summary
}
