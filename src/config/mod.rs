//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::calculate::SameTimestampOrder;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Cube availability reconstruction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// Order of change events sharing a timestamp: "input", "adds-first"
    /// or "removes-first"
    #[serde(default)]
    pub same_timestamp_order: SameTimestampOrder,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// JSON file mapping season names to date ranges
    #[serde(default = "default_seasons_file")]
    pub seasons_file: PathBuf,

    #[serde(default)]
    pub availability: AvailabilityConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_seasons_file() -> PathBuf {
    PathBuf::from("./config/seasons.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            seasons_file: default_seasons_file(),
            availability: AvailabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, or use defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seasons_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "seasons_file must not be empty".to_string(),
            ));
        }

        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "data_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.seasons_file, PathBuf::from("./config/seasons.json"));
        assert_eq!(
            config.availability.same_timestamp_order,
            SameTimestampOrder::Input
        );
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_seasons_file() {
        let mut config = AppConfig::default();
        config.seasons_file = PathBuf::new();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            data_dir = "/srv/league"

            [availability]
            same_timestamp_order = "removes-first"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/league"));
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.availability.same_timestamp_order,
            SameTimestampOrder::RemovesFirst
        );
    }

    #[test]
    fn test_parse_rejects_unknown_order() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [availability]
            same_timestamp_order = "random"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_and_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manacore.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");

        let missing = temp_dir.path().join("missing.toml");
        assert!(AppConfig::from_file(&missing).is_err());
        assert_eq!(
            AppConfig::load_or_default(&missing).unwrap().log_level,
            "info"
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(
            config.availability.same_timestamp_order,
            parsed.availability.same_timestamp_order
        );
    }
}
