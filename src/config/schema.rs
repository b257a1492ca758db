//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::batch::{check_template, OutputNaming};
use crate::engine::midi::{FileOptions, GM_DRUM_CHANNEL};

/// Main configuration for drumremap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemapperConfig {
    /// Directory holding mapping files (default: mappings)
    #[serde(default = "default_mappings_dir")]
    pub mappings_dir: PathBuf,

    /// Channel (0-15) forced onto note events; null keeps source channels
    #[serde(default = "default_drum_channel")]
    pub drum_channel: Option<u8>,

    /// Appended to the input file stem when no output path is given
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Output name template, e.g. "{filename}_gm{ext}" or "converted/"
    #[serde(default)]
    pub output_template: Option<String>,
}

fn default_mappings_dir() -> PathBuf { PathBuf::from("mappings") }
fn default_drum_channel() -> Option<u8> { Some(GM_DRUM_CHANNEL) }
fn default_output_suffix() -> String { "_remap".to_string() }

impl Default for RemapperConfig {
    fn default() -> Self {
        Self {
            mappings_dir: default_mappings_dir(),
            drum_channel: default_drum_channel(),
            output_suffix: default_output_suffix(),
            output_template: None,
        }
    }
}

impl RemapperConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(channel) = self.drum_channel {
            if channel > 15 {
                bail!("Drum channel must be between 0 and 15 (got {})", channel);
            }
        }
        if self.output_suffix.is_empty() {
            bail!("Output suffix must not be empty");
        }
        if self.output_suffix.contains(['/', '\\']) {
            bail!("Output suffix must not contain path separators");
        }
        if let Some(template) = &self.output_template {
            check_template(template)?;
        }
        Ok(())
    }

    /// Options for the MIDI file layer
    pub fn file_options(&self) -> FileOptions {
        FileOptions {
            drum_channel: self.drum_channel,
        }
    }

    /// Output naming, with `template` taking the place of the configured one
    pub fn output_naming(&self, template: Option<String>) -> Result<OutputNaming> {
        OutputNaming::new(template.or_else(|| self.output_template.clone()), &self.output_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config: RemapperConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, RemapperConfig::default());
        assert_eq!(config.drum_channel, Some(9));
        assert_eq!(config.output_suffix, "_remap");
    }

    #[test]
    fn test_keep_source_channel() {
        let config: RemapperConfig = serde_yaml::from_str("drum_channel: null").unwrap();
        assert_eq!(config.drum_channel, None);
        assert_eq!(config.file_options().drum_channel, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_channel() {
        let config = RemapperConfig {
            drum_channel: Some(16),
            ..RemapperConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_suffix() {
        let empty = RemapperConfig {
            output_suffix: String::new(),
            ..RemapperConfig::default()
        };
        assert!(empty.validate().is_err());

        let nested = RemapperConfig {
            output_suffix: "/out".to_string(),
            ..RemapperConfig::default()
        };
        assert!(nested.validate().is_err());
    }

    #[test]
    fn test_output_template() {
        let config: RemapperConfig =
            serde_yaml::from_str("output_template: \"{filename}_gm{ext}\"").unwrap();
        assert!(config.validate().is_ok());

        let naming = config.output_naming(None).unwrap();
        assert_eq!(
            naming.output_for(std::path::Path::new("/songs/beat.mid")),
            PathBuf::from("/songs/beat_gm.mid")
        );
        let naming = config.output_naming(Some("final.mid".to_string())).unwrap();
        assert_eq!(
            naming.output_for(std::path::Path::new("/songs/beat.mid")),
            PathBuf::from("final.mid")
        );

        let bad = RemapperConfig {
            output_template: Some("{stem}.mid".to_string()),
            ..RemapperConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
