//! Configuration management for flightdelay.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "flightdelay";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "users.db";

/// Default model artifact file name.
const MODEL_FILE_NAME: &str = "lr_model.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTDELAY_`, `__` between sections)
/// 2. TOML config file at `~/.config/flightdelay/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session cookie configuration.
    pub session: SessionConfig,
    /// Regression model configuration.
    pub model: ModelConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_address: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/flightdelay/users.db`
    pub database_path: Option<PathBuf>,
}

/// Session-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Hours a session stays valid after sign-in.
    pub ttl_hours: u32,
    /// Mark the cookie `Secure` (HTTPS only).
    pub secure_cookie: bool,
}

/// Model-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the regression model artifact.
    /// Defaults to `~/.local/share/flightdelay/lr_model.json`
    pub path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "flightdelay_session".to_string(),
            ttl_hours: 24,
            secure_cookie: false,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Reads `config_path` if given, otherwise [`Config::default_config_path`].
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLIGHTDELAY_").split("__"));

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
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid bind_address: {}", self.server.bind_address),
            });
        }

        if self.session.cookie_name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "session cookie_name must not be empty".to_string(),
            });
        }

        if self.session.ttl_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "session ttl_hours must be greater than 0".to_string(),
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

    /// Get the model artifact path, resolving defaults if not set.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.model
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(MODEL_FILE_NAME))
    }

    /// Get the session lifetime as a Duration.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.session.ttl_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_address, "127.0.0.1:5000");
        assert!(config.storage.database_path.is_none());
        assert!(config.model.path.is_none());
        assert_eq!(config.session.cookie_name, "flightdelay_session");
        assert_eq!(config.session.ttl_hours, 24);
        assert!(!config.session.secure_cookie);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_bind_address() {
        let mut config = Config::default();
        config.server.bind_address = "not an address".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bind_address"));
    }

    #[test]
    fn test_validate_empty_cookie_name() {
        let mut config = Config::default();
        config.session.cookie_name = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("cookie_name"));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut config = Config::default();
        config.session.ttl_hours = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("ttl_hours"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("users.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/users.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/users.sqlite")
        );
    }

    #[test]
    fn test_model_path_default() {
        let config = Config::default();
        let path = config.model_path();

        assert!(path.to_string_lossy().contains("flightdelay"));
        assert!(path.to_string_lossy().ends_with("lr_model.json"));
    }

    #[test]
    fn test_session_ttl() {
        let mut config = Config::default();
        config.session.ttl_hours = 2;

        assert_eq!(config.session_ttl(), Duration::hours(2));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("flightdelay"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config.example.toml");
        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_session_config_deserialize() {
        let json = r#"{"cookie_name": "sid", "ttl_hours": 8}"#;
        let session: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(session.cookie_name, "sid");
        assert_eq!(session.ttl_hours, 8);
        assert!(!session.secure_cookie);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("bind_address"));
        assert!(json.contains("cookie_name"));
    }
}
