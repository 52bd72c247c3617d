//! Session configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Settings for the session controller and its stores.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct SessionConfig {
    /// Directory holding one JSON file per match.
    #[serde(default = "default_store_dir")]
    store_dir: PathBuf,

    /// Seconds a player may sit on their turn before forfeiting.
    #[serde(default = "default_move_timeout_secs")]
    move_timeout_secs: u64,

    /// Moves one player may submit within a rolling minute.
    #[serde(default = "default_max_moves_per_minute")]
    max_moves_per_minute: usize,

    /// Minimum gap between two moves by the same player.
    #[serde(default = "default_min_move_interval_ms")]
    min_move_interval_ms: u64,

    /// Whether the move throttle is applied at all.
    #[serde(default)]
    throttle_enabled: bool,

    /// Compare-and-set attempts before a move gives up with a conflict.
    #[serde(default = "default_write_retries")]
    write_retries: u32,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("games")
}

fn default_move_timeout_secs() -> u64 {
    300
}

fn default_max_moves_per_minute() -> usize {
    10
}

fn default_min_move_interval_ms() -> u64 {
    1000
}

fn default_write_retries() -> u32 {
    3
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            move_timeout_secs: default_move_timeout_secs(),
            max_moves_per_minute: default_max_moves_per_minute(),
            min_move_interval_ms: default_min_move_interval_ms(),
            throttle_enabled: false,
            write_retries: default_write_retries(),
        }
    }
}

impl SessionConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(store_dir = %config.store_dir.display(), "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.write_retries == 0 {
            return Err(ConfigError::new("write_retries must be at least 1".to_string()));
        }
        if config.throttle_enabled && config.max_moves_per_minute == 0 {
            return Err(ConfigError::new(
                "max_moves_per_minute must be at least 1 when the throttle is enabled".to_string(),
            ));
        }
        Ok(config)
    }

    /// The turn deadline as a duration.
    pub fn move_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.move_timeout_secs).unwrap_or(i64::MAX))
    }

    /// The minimum move gap as a duration.
    pub fn min_move_interval(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.min_move_interval_ms).unwrap_or(i64::MAX))
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
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
