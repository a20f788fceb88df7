//! Configuration management for tracklog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sample::coordinates_valid;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "tracklog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "history.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TRACKLOG_`, with `__`
///    separating nesting, e.g. `TRACKLOG_SAMPLER__INTERVAL_SECS`)
/// 2. TOML config file at `~/.config/tracklog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Sampler configuration.
    pub sampler: SamplerConfig,
    /// Background continuation configuration.
    pub background: BackgroundConfig,
    /// Simulated location source configuration.
    pub source: SourceConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/tracklog/history.db`
    pub database_path: Option<PathBuf>,
}

/// Sampler-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Interval between location fix requests in seconds.
    pub interval_secs: u64,
}

/// Background continuation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Maximum extra sampling time after backgrounding, in seconds.
    ///
    /// This is the host-imposed ceiling on the execution lease; the
    /// lease is best-effort and never renewed.
    pub grace_secs: u64,
}

/// Simulated location source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Starting latitude for the simulated source.
    pub start_latitude: f64,
    /// Starting longitude for the simulated source.
    pub start_longitude: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self { grace_secs: 180 }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            start_latitude: 40.0,
            start_longitude: 29.0,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `TRACKLOG_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            // Double underscore separates nesting; leaf keys contain
            // single underscores themselves
            .merge(Env::prefixed("TRACKLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.sampler.interval_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "interval_secs must be greater than 0".to_string(),
            });
        }

        if self.background.grace_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "grace_secs must be greater than 0".to_string(),
            });
        }

        if !coordinates_valid(self.source.start_latitude, self.source.start_longitude) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "invalid start coordinates: ({}, {})",
                    self.source.start_latitude, self.source.start_longitude
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the sample interval as a Duration.
    #[must_use]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sampler.interval_secs)
    }

    /// Get the background grace period as a Duration.
    #[must_use]
    pub fn background_grace(&self) -> Duration {
        Duration::from_secs(self.background.grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.sampler.interval_secs, 10);
        assert_eq!(config.background.grace_secs, 180);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_default_source_config() {
        let source = SourceConfig::default();
        assert!(coordinates_valid(
            source.start_latitude,
            source.start_longitude
        ));
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default();
        config.sampler.interval_secs = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("interval_secs"));
    }

    #[test]
    fn test_validate_zero_grace() {
        let mut config = Config::default();
        config.background.grace_secs = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("grace_secs"));
    }

    #[test]
    fn test_validate_invalid_start_coordinates() {
        let mut config = Config::default();
        config.source.start_latitude = 91.0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("start coordinates"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("history.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_sample_interval() {
        let config = Config::default();
        assert_eq!(config.sample_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_background_grace() {
        let config = Config::default();
        assert_eq!(config.background_grace(), Duration::from_secs(180));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("tracklog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("tracklog"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_override_applies() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TRACKLOG_SAMPLER__INTERVAL_SECS", "5");
            jail.set_env("TRACKLOG_SOURCE__START_LATITUDE", "41.5");

            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .expect("config should load");
            assert_eq!(config.sampler.interval_secs, 5);
            assert!((config.source.start_latitude - 41.5).abs() < f64::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn test_env_override_database_path() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TRACKLOG_STORAGE__DATABASE_PATH", "/env/history.db");

            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .expect("config should load");
            assert_eq!(config.database_path(), PathBuf::from("/env/history.db"));
            Ok(())
        });
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("interval_secs"));
        assert!(json.contains("grace_secs"));
    }

    #[test]
    fn test_sampler_config_deserialize() {
        let json = r#"{"interval_secs": 5}"#;
        let sampler: SamplerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(sampler.interval_secs, 5);
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
