//! Configuration management for the dashboard.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unparsable or out-of-range values fall back to the default.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use taskboard_core::environment::Calendar;
use taskboard_core::search::DEFAULT_DEBOUNCE;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Quiet period after the last search keystroke, in milliseconds
    pub search_debounce_ms: u64,
    /// Offset east of UTC, in minutes, at which calendar days start
    pub utc_offset_minutes: i32,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `TASKBOARD_SEARCH_DEBOUNCE_MS` | `300` |
    /// | `TASKBOARD_UTC_OFFSET_MINUTES` | `0` |
    /// | `TASKBOARD_LOG_LEVEL` | `info` |
    /// | `TASKBOARD_SHUTDOWN_TIMEOUT_SECS` | `5` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            search_debounce_ms: lookup("TASKBOARD_SEARCH_DEBOUNCE_MS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.search_debounce_ms),
            utc_offset_minutes: lookup("TASKBOARD_UTC_OFFSET_MINUTES")
                .and_then(|s| s.trim().parse().ok())
                .filter(|minutes| Calendar::from_offset_minutes(*minutes).is_some())
                .unwrap_or(defaults.utc_offset_minutes),
            log_level: lookup("TASKBOARD_LOG_LEVEL")
                .map(|s| s.trim().to_lowercase())
                .filter(|level| {
                    matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error")
                })
                .unwrap_or(defaults.log_level),
            shutdown_timeout_secs: lookup("TASKBOARD_SHUTDOWN_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.shutdown_timeout_secs),
        }
    }

    /// Search debounce as a duration
    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Calendar with the configured day boundary
    #[must_use]
    pub fn calendar(&self) -> Calendar {
        Calendar::from_offset_minutes(self.utc_offset_minutes).unwrap_or_default()
    }

    /// Shutdown timeout as a duration
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Default `EnvFilter` directive for this binary's crates
    #[must_use]
    pub fn log_filter(&self) -> String {
        format!(
            "taskboard={level},taskboard_core={level},taskboard_runtime={level}",
            level = self.log_level
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_debounce_ms: u64::try_from(DEFAULT_DEBOUNCE.as_millis()).unwrap_or(300),
            utc_offset_minutes: 0,
            log_level: "info".to_string(),
            shutdown_timeout_secs: 5,
        }
    }
}
