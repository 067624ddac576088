//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/spinlog/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/spinlog/` (~/.config/spinlog/)
//! - State/Logs: `$XDG_STATE_HOME/spinlog/` (~/.local/state/spinlog/)

use crate::analytics::charts::{ChartOptions, DAILY_WINDOW, HOURLY_WINDOW};
use crate::cache::CacheKind;
use crate::error::{Error, Result};
use crate::types::DuplicatePolicy;
use chrono::{NaiveDate, TimeDelta, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name prefix of the rolling log files.
pub const LOG_FILE_PREFIX: &str = "spinlog";
/// File name suffix of the rolling log files.
pub const LOG_FILE_SUFFIX: &str = "log";

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
    /// Chart window configuration
    #[serde(default)]
    pub charts: ChartsConfig,

    /// Cache TTL overrides
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Calendar used to align buckets
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClockZone {
    /// The system's local time zone
    #[default]
    Local,
    Utc,
}

/// Chart configuration
#[derive(Debug, Deserialize)]
pub struct ChartsConfig {
    /// Number of hourly bars
    #[serde(default = "default_hourly_window")]
    pub hourly_window: usize,

    /// Number of daily bars
    #[serde(default = "default_daily_window")]
    pub daily_window: usize,

    /// How observations sharing a bucket are combined
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Calendar for bucket alignment
    #[serde(default)]
    pub timezone: ClockZone,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            hourly_window: default_hourly_window(),
            daily_window: default_daily_window(),
            duplicate_policy: DuplicatePolicy::default(),
            timezone: ClockZone::default(),
        }
    }
}

impl ChartsConfig {
    pub fn hourly_options(&self) -> ChartOptions {
        ChartOptions {
            window_size: self.hourly_window,
            policy: self.duplicate_policy,
        }
    }

    pub fn daily_options(&self) -> ChartOptions {
        ChartOptions {
            window_size: self.daily_window,
            policy: self.duplicate_policy,
        }
    }
}

fn default_hourly_window() -> usize {
    HOURLY_WINDOW
}

fn default_daily_window() -> usize {
    DAILY_WINDOW
}

/// Cache TTL overrides, in seconds
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CacheConfig {
    pub profile_ttl_secs: Option<u64>,
    pub listening_history_ttl_secs: Option<u64>,
    pub top_items_ttl_secs: Option<u64>,
    pub search_ttl_secs: Option<u64>,
    pub artwork_ttl_secs: Option<u64>,
}

impl CacheConfig {
    /// Effective TTL for a cache kind: the override if set, else the default.
    pub fn ttl(&self, kind: CacheKind) -> TimeDelta {
        let override_secs = match kind {
            CacheKind::Profile => self.profile_ttl_secs,
            CacheKind::ListeningHistory => self.listening_history_ttl_secs,
            CacheKind::TopItems => self.top_items_ttl_secs,
            CacheKind::Search => self.search_ttl_secs,
            CacheKind::Artwork => self.artwork_ttl_secs,
        };
        override_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(TimeDelta::try_seconds)
            .unwrap_or_else(|| kind.default_ttl())
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
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

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every chart empty
    pub fn validate(&self) -> Result<()> {
        if self.charts.hourly_window == 0 {
            return Err(Error::Config(
                "charts.hourly_window must be at least 1".to_string(),
            ));
        }
        if self.charts.daily_window == 0 {
            return Err(Error::Config(
                "charts.daily_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/spinlog/config.toml` (~/.config/spinlog/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("spinlog").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/spinlog/` (~/.local/state/spinlog/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("spinlog")
    }

    /// Returns today's log file path
    ///
    /// Logs rotate daily on the UTC date, so this is
    /// `$XDG_STATE_HOME/spinlog/spinlog.YYYY-MM-DD.log`.
    pub fn log_path() -> PathBuf {
        Self::log_path_for(Utc::now().date_naive())
    }

    /// Returns the log file written on `date` (UTC)
    pub fn log_path_for(date: NaiveDate) -> PathBuf {
        Self::state_dir().join(format!(
            "{}.{}.{}",
            LOG_FILE_PREFIX,
            date.format("%Y-%m-%d"),
            LOG_FILE_SUFFIX
        ))
    }
}
