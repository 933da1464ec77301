use crate::errors::{SurveyorError, SurveyorResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_MESSAGE_HISTORY_LIMIT: u32 = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const API_URL_ENV: &str = "SURVEYOR_API_URL";
pub const LOG_LEVEL_ENV: &str = "SURVEYOR_LOG_LEVEL";

/// Configuration for the session service client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub message_history_limit: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            poll_interval_ms: Some(DEFAULT_POLL_INTERVAL_MS),
            message_history_limit: Some(DEFAULT_MESSAGE_HISTORY_LIMIT),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level: Some("info".to_string()),
        }
    }
}

impl ClientConfig {
    /// A config with every field unset, useful as a merge overlay
    pub fn empty() -> Self {
        Self {
            api_url: None,
            poll_interval_ms: None,
            message_history_limit: None,
            request_timeout_secs: None,
            log_level: None,
        }
    }

    /// Loads configuration from a file if it exists, otherwise returns the default config.
    /// Values present in the file are layered over the defaults.
    pub fn load_from_file(path: &Path) -> SurveyorResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SurveyorError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            SurveyorError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        Ok(Self::default().merge(&config))
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> SurveyorResult<()> {
        let content = toml::to_string(self).map_err(|e| {
            SurveyorError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SurveyorError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            SurveyorError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Reads the overlay coming from the process environment (and a `.env` file, if any)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_url: std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty()),
            log_level: std::env::var(LOG_LEVEL_ENV).ok().filter(|v| !v.trim().is_empty()),
            ..Self::empty()
        }
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_url: other.api_url.clone().or_else(|| self.api_url.clone()),
            poll_interval_ms: other.poll_interval_ms.or(self.poll_interval_ms),
            message_history_limit: other.message_history_limit.or(self.message_history_limit),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
        }
    }

    /// Base URL of the session service, without a trailing slash
    pub fn api_url(&self) -> String {
        self.api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero period would make the poller spin
        Duration::from_millis(
            self.poll_interval_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        )
    }

    pub fn message_history_limit(&self) -> u32 {
        self.message_history_limit
            .unwrap_or(DEFAULT_MESSAGE_HISTORY_LIMIT)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> SurveyorResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        SurveyorError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> SurveyorResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
