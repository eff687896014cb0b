//! Configuration module for the Taskdeck client.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `TASKDECK_API_URL` | Yes | - | Base URL of the task API (e.g., `https://tasks.example.com/api`) |
//! | `TASKDECK_DATA_DIR` | No | `~/.taskdeck` | Directory holding the session token and the board log |
//! | `TASKDECK_REQUEST_TIMEOUT_SECS` | No | (none) | Per-request timeout in seconds, must be > 0 |
//!
//! # Example
//!
//! ```no_run
//! use taskdeck_client::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("API URL: {}", config.api_url);
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::BaseDirs;
use thiserror::Error;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "TASKDECK_API_URL";

/// Environment variable overriding the data directory.
pub const DATA_DIR_VAR: &str = "TASKDECK_DATA_DIR";

/// Environment variable setting the request timeout.
pub const REQUEST_TIMEOUT_VAR: &str = "TASKDECK_REQUEST_TIMEOUT_SECS";

/// Default data directory name relative to home.
const DEFAULT_DATA_DIR: &str = ".taskdeck";

/// File name of the board log inside the data directory.
const LOG_FILE_NAME: &str = "taskdeck.log";

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

/// Configuration for the Taskdeck client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote task API.
    pub api_url: String,

    /// Directory for the session token and the board log.
    pub data_dir: PathBuf,

    /// Optional per-request timeout. `None` leaves the transport default.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `TASKDECK_API_URL` is not set or is blank
    /// - `TASKDECK_REQUEST_TIMEOUT_SECS` is set but is not a positive integer
    /// - The home directory cannot be determined and `TASKDECK_DATA_DIR` is unset
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_api_url(None)
    }

    /// Like [`Config::from_env`], but `api_url` (when given) takes precedence
    /// over `TASKDECK_API_URL`, which then becomes optional.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_env_with_api_url(api_url: Option<String>) -> Result<Self, ConfigError> {
        let api_url = match api_url.or_else(|| env::var(API_URL_VAR).ok()) {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    key: API_URL_VAR.to_string(),
                    message: "API URL cannot be empty".to_string(),
                })
            }
            None => return Err(ConfigError::MissingEnvVar(API_URL_VAR.to_string())),
        };

        // Optional: TASKDECK_DATA_DIR (default: ~/.taskdeck)
        let data_dir = match env::var(DATA_DIR_VAR) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => {
                let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
                base_dirs.home_dir().join(DEFAULT_DATA_DIR)
            }
        };

        // Optional: TASKDECK_REQUEST_TIMEOUT_SECS (must be > 0)
        let request_timeout = match env::var(REQUEST_TIMEOUT_VAR) {
            Ok(val) => {
                let secs = val
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: REQUEST_TIMEOUT_VAR.to_string(),
                        message: format!("expected positive integer, got '{val}'"),
                    })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: REQUEST_TIMEOUT_VAR.to_string(),
                        message: "timeout must be greater than 0".to_string(),
                    });
                }
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            api_url,
            data_dir,
            request_timeout,
        })
    }

    /// Path of the log file written while the interactive board runs.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}
