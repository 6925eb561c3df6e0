//! Client configuration loaded from TOML, the environment, and the CLI.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::settings::{Difficulty, GameSettings, Mode};

/// Environment variable that overrides [`ClientConfig::server_url`].
pub const SERVER_URL_ENV: &str = "RENJU_SERVER_URL";

/// Configuration for one client process.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the game service.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// Who plays each side.
    #[serde(default)]
    #[getter(copy)]
    mode: Mode,

    /// Strength of the automated opponent.
    #[serde(default)]
    difficulty: Difficulty,

    /// Seconds before a request to the service is abandoned.
    #[serde(default = "default_request_timeout_secs")]
    #[getter(copy)]
    request_timeout_secs: u64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            mode: Mode::default(),
            difficulty: Difficulty::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(server_url = %config.server_url, mode = %config.mode, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` when it exists, defaults otherwise, then applies the
    /// [`SERVER_URL_ENV`] override.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            debug!(server_url = %url, "Server URL overridden by environment");
            config = config.with_server_url(url)?;
        }
        Ok(config)
    }

    /// Replaces the server URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        self.server_url = url.into();
        self.validate()?;
        Ok(self)
    }

    /// Replaces the mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Result<Self, ConfigError> {
        self.difficulty = difficulty;
        self.validate()?;
        Ok(self)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings for a new controller.
    pub fn game_settings(&self) -> GameSettings {
        GameSettings::new(self.mode, self.difficulty.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ConfigError::new(format!(
                "server_url must start with http:// or https://, got {:?}",
                self.server_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::new(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.difficulty.as_str().trim().is_empty() {
            return Err(ConfigError::new("difficulty must not be empty".to_string()));
        }
        Ok(())
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
