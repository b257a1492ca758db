//! Mapping library
//!
//! A directory of mapping files named after the conversion they perform,
//! e.g. `ssd5_to_musescore.yaml`. The built-in "as Source" entry keeps
//! notes untouched.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::compiler::compile;
use super::document::{DocumentFormat, MappingDocument};
use super::table::RuleTable;

/// Name of the built-in entry that leaves notes unchanged
pub const AS_SOURCE: &str = "as Source";

/// Which mapping to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSelection {
    /// Keep every note as it is
    AsSource,
    /// A mapping file, by name or path
    File(PathBuf),
}

impl MappingSelection {
    /// Interpret a user-supplied mapping name
    pub fn from_name(name: &str) -> Self {
        if name == AS_SOURCE {
            MappingSelection::AsSource
        } else {
            MappingSelection::File(PathBuf::from(name))
        }
    }

    pub fn is_as_source(&self) -> bool {
        matches!(self, MappingSelection::AsSource)
    }
}

/// Read, decode and compile a single mapping file
pub fn load_mapping(path: &Path) -> Result<RuleTable> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read mapping file: {}", path.display()))?;
    let document = MappingDocument::parse(&contents, DocumentFormat::from_path(path))
        .with_context(|| format!("invalid mapping file: {}", path.display()))?;
    let table = compile(&document)
        .with_context(|| format!("invalid mapping file: {}", path.display()))?;

    if table.name().is_none() {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        return Ok(table.with_name(stem));
    }
    Ok(table)
}

/// A directory holding mapping files
#[derive(Debug, Clone)]
pub struct MappingLibrary {
    dir: PathBuf,
}

impl MappingLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).with_context(|| {
                format!("failed to create mappings directory: {}", self.dir.display())
            })?;
            debug!(dir = %self.dir.display(), "created mappings directory");
        }
        Ok(())
    }

    /// List selectable mappings: "as Source" first, then conversion files
    ///
    /// Only files whose stem contains `to` count as conversion tables.
    pub fn list_available(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        if self.dir.is_dir() {
            let entries = std::fs::read_dir(&self.dir)
                .with_context(|| format!("failed to read {}", self.dir.display()))?;
            for entry in entries {
                let path = entry?.path();
                if !path.is_file() || !DocumentFormat::is_mapping_file(&path) {
                    continue;
                }
                let is_conversion = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| stem.contains("to"));
                if !is_conversion {
                    continue;
                }
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        names.insert(0, AS_SOURCE.to_string());
        Ok(names)
    }

    /// Resolve a mapping name to a path
    ///
    /// A bare file name prefers the library directory and only falls back to
    /// the working directory when the library has no such file. Names with a
    /// directory part are used as given.
    pub fn path_of(&self, name: &Path) -> PathBuf {
        let is_bare = name.components().count() == 1;
        if !is_bare {
            return name.to_path_buf();
        }

        let in_library = self.dir.join(name);
        if in_library.exists() || !name.exists() {
            in_library
        } else {
            name.to_path_buf()
        }
    }

    /// Load a selection into a rule table
    pub fn load(&self, selection: &MappingSelection) -> Result<RuleTable> {
        match selection {
            MappingSelection::AsSource => Ok(RuleTable::identity()),
            MappingSelection::File(name) => {
                let path = self.path_of(name);
                if !path.exists() {
                    bail!(
                        "mapping file not found: {}\nPlease make sure the file exists.",
                        path.display()
                    );
                }
                load_mapping(&path)
            }
        }
    }
}
