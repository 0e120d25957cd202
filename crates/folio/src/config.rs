//! Configuration management for folio.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. The
//! resulting [`Config`] is built once at startup and handed to the store and
//! the HTTP layer; nothing reads configuration from global state.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "folio";

/// Default feedback directory name inside the data directory.
const FEEDBACK_DIR_NAME: &str = "feedback";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "FOLIO_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FOLIO_`, sections split on `__`)
/// 2. TOML config file at `~/.config/folio/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Deployment environment name, reported by the health check.
    pub environment: String,
    /// Origins allowed to call the API cross-site.
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Maximum accepted request body size in bytes.
    pub body_limit_bytes: usize,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `feedback.json` and the daily logs.
    /// Defaults to `~/.local/share/folio/feedback`
    pub feedback_dir: Option<PathBuf>,
    /// Mirror every submission into a per-day text log.
    pub daily_log: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            allowed_origins: Vec::new(),
            body_limit_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            feedback_dir: None, // Will be resolved to default at runtime
            daily_log: true,
        }
    }
}

impl Config {
    /// Load configuration, reading the TOML file at `config_path` or at
    /// [`Config::default_config_path`] when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

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
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "port must be greater than 0".to_string(),
            });
        }

        if self.server.body_limit_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "body_limit_bytes must be greater than 0".to_string(),
            });
        }

        if self.server.environment.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "environment cannot be empty".to_string(),
            });
        }

        if let Some(origin) = self
            .server
            .allowed_origins
            .iter()
            .find(|origin| axum::http::HeaderValue::from_str(origin).is_err())
        {
            return Err(Error::ConfigValidation {
                message: format!("invalid allowed origin: {origin}"),
            });
        }

        Ok(())
    }

    /// Get the feedback directory, resolving defaults if not set.
    #[must_use]
    pub fn feedback_dir(&self) -> PathBuf {
        self.storage
            .feedback_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(FEEDBACK_DIR_NAME))
    }

    /// Get the path of the JSON store.
    #[must_use]
    pub fn feedback_file(&self) -> PathBuf {
        self.feedback_dir().join(crate::storage::STORE_FILE_NAME)
    }

    /// Get the `host:port` address the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
