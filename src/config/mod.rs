//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<RemapperConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config: RemapperConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration if the file exists, defaults otherwise
pub fn load_or_default(path: &Path) -> Result<RemapperConfig> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(RemapperConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use std::io::Write;

    #[test]
    fn test_load_config() {
        let yaml = r#"
mappings_dir: /opt/drums/mappings
drum_channel: 9
output_suffix: _gm
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.mappings_dir, Path::new("/opt/drums/mappings"));
        assert_eq!(config.output_suffix, "_gm");
        assert_eq!(config.output_template.as_deref(), Some("{input_dir}/gm/{filename}{ext}"));
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"drum_channel: 20\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = load_or_default(Path::new("/nonexistent/drumremap.yaml")).unwrap();
        assert_eq!(config, RemapperConfig::default());
    }
}
