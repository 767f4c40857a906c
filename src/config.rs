//! Application configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Environment variable that overrides the database path.
pub const DATABASE_PATH_ENV: &str = "MATHLE_DATABASE_PATH";

/// Settings for the puzzle CLI.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sqlite database file.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Rows shown by leaderboard commands.
    #[serde(default = "default_leaderboard_limit")]
    leaderboard_limit: usize,

    /// JSON file holding the local player's result history.
    #[serde(default)]
    history_path: Option<PathBuf>,
}

fn default_database_path() -> String {
    "strictly_mathle.db".to_string()
}

fn default_leaderboard_limit() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            leaderboard_limit: default_leaderboard_limit(),
            history_path: None,
        }
    }
}

impl AppConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml_str(&content)?;
        info!(database_path = %config.database_path, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file if it exists, otherwise defaults, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        if let Ok(db_path) = std::env::var(DATABASE_PATH_ENV) {
            config.apply_database_override(db_path);
        }

        Ok(config)
    }

    /// Replaces the database path when the override is non-blank.
    #[instrument(skip(self))]
    pub fn apply_database_override(&mut self, db_path: String) {
        if db_path.trim().is_empty() {
            return;
        }
        debug!(db_path = %db_path, "Overriding database path");
        self.database_path = db_path;
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_toml_fields() {
        let config = AppConfig::from_toml_str(
            r#"
            database_path = "puzzles.db"
            leaderboard_limit = 25
            history_path = "history.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.database_path(), "puzzles.db");
        assert_eq!(*config.leaderboard_limit(), 25);
        assert_eq!(config.history_path().as_deref(), Some(Path::new("history.json")));
    }

    #[test]
    fn test_malformed_toml() {
        let err = AppConfig::from_toml_str("leaderboard_limit = \"ten\"").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/strictly_mathle.toml").unwrap();
        assert_eq!(*config.leaderboard_limit(), 10);
    }

    #[test]
    fn test_blank_override_ignored() {
        let mut config = AppConfig::default();
        config.apply_database_override("  ".to_string());
        assert_eq!(config.database_path(), "strictly_mathle.db");
        config.apply_database_override("other.db".to_string());
        assert_eq!(config.database_path(), "other.db");
    }
}
