//! Configuration module, loads translator settings from a JSON file

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file looked up by the binary
pub const DEFAULT_CONFIG_FILE: &str = "mongo_find_sql.json";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot parse JSON config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Translator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Render Mongo's `_id` as `id`
    pub rename_id: bool,
    /// Where the REPL keeps its line history
    pub history_file: Option<PathBuf>,
}

impl TranslatorConfig {
    /// Loads the configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path_ref.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_load_valid_json_config() {
        let path = temp_path("valid_config.json");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"{{ "rename_id": true, "history_file": "/tmp/history.txt" }}"#).unwrap();

        let config = TranslatorConfig::from_json_file(&path).unwrap();
        assert!(config.rename_id);
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/history.txt")));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let path = temp_path("partial_config.json");
        fs::write(&path, "{}").unwrap();

        let config = TranslatorConfig::from_json_file(&path).unwrap();
        assert_eq!(config, TranslatorConfig::default());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_json_config() {
        let path = temp_path("invalid_config.json");
        fs::write(&path, "invalid json").unwrap();

        let result = TranslatorConfig::from_json_file(&path);
        assert!(matches!(result, Err(ConfigError::Json { .. })));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file() {
        let result = TranslatorConfig::from_json_file("non_existent_file.json");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
