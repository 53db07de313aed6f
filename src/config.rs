//! Configuration for ai-insights
//!
//! Every field has a default matching the repository layout, so a config file
//! only needs to name the values it changes.

use crate::error::{InsightsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default SQLite database location
pub const DEFAULT_DB_PATH: &str = "./db/ai_insights.db";

/// Default directory scanned for `*.sql` and `*_insert.sql` files
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Directory holding schema and insert files
    pub data_dir: PathBuf,

    /// Source CSV for the `convert` command
    pub csv_path: PathBuf,

    /// Generated insert file
    pub insert_output: PathBuf,

    /// Generated PostgreSQL schema file
    pub schema_output: PathBuf,

    /// Log a progress line every N records
    pub progress_interval: usize,

    /// Statement failures logged in detail per file before suppression
    pub max_logged_failures: usize,

    /// Draw a progress bar during conversion
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            csv_path: PathBuf::from("data/models/notable_ai_models.csv"),
            insert_output: PathBuf::from("data/models/notable_ai_models_insert.sql"),
            schema_output: PathBuf::from("data/models/ai_models.sql"),
            progress_interval: 100,
            max_logged_failures: 10,
            show_progress: true,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            InsightsError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline misbehave
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval == 0 {
            return Err(InsightsError::Config(
                "progress_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.max_logged_failures, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"db_path": "other.db", "show_progress": false}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("other.db"));
        assert!(!config.show_progress);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn test_invalid_progress_interval() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"progress_interval": 0}}"#).unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(InsightsError::Config(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_file("/nonexistent/ai-insights.json");
        assert!(matches!(result, Err(InsightsError::Config(_))));
    }
}
