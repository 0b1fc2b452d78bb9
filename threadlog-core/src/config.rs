//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/threadlog/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/threadlog/` (~/.config/threadlog/)
//! - State/Logs: `$XDG_STATE_HOME/threadlog/` (~/.local/state/threadlog/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Input/output locations
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where raw process logs are read from and per-thread logs written to
#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Directory of raw, interleaved process logs
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory receiving one `<pid>-<tid>.log` file per thread
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Glob pattern selecting raw files inside `input_dir`
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            pattern: default_pattern(),
        }
    }
}

impl IngestConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(Error::Config("ingest.pattern must not be empty".to_string()));
        }
        if self.input_dir == self.output_dir {
            return Err(Error::Config(
                "ingest.output_dir must differ from ingest.input_dir".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./rawlogs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./mergedlogs")
}

fn default_pattern() -> String {
    "*".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/threadlog/config.toml` (~/.config/threadlog/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("threadlog").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/threadlog/` (~/.local/state/threadlog/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("threadlog")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/threadlog/threadlog.log` (~/.local/state/threadlog/threadlog.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("threadlog.log")
    }
}
