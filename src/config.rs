//! Config — typed settings parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a `DEFAULT_*` constant and an `IDEABOARD_*` variable.
//! Unparseable values fall back to the default; values that parse but make
//! no sense (a zero-capacity queue, an inverted zoom range) are rejected so
//! the binary fails at startup instead of misbehaving later.

use std::path::PathBuf;

use canvas::engine::EngineConfig;

use crate::persistence::PersistConfig;

pub const DEFAULT_DEBOUNCE_MS: f64 = 200.0;
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 4.0;
pub const DEFAULT_MIN_ZOOM: f64 = 0.25;
pub const DEFAULT_MAX_ZOOM: f64 = 4.0;
pub const DEFAULT_PERSIST_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_PERSIST_RETRIES: usize = 0;
pub const DEFAULT_PERSIST_RETRY_BASE_MS: u64 = 50;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Everything the binary needs to run a board session.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub persist: PersistConfig,
    /// JSON board snapshot to seed the store with.
    pub seed_path: Option<PathBuf>,
    /// JSON input script to replay against the session.
    pub script_path: Option<PathBuf>,
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `IDEABOARD_DEBOUNCE_MS`: default 200
    /// - `IDEABOARD_DRAG_THRESHOLD_PX`: default 4
    /// - `IDEABOARD_MIN_ZOOM` / `IDEABOARD_MAX_ZOOM`: default 0.25 / 4.0
    /// - `IDEABOARD_PERSIST_QUEUE_CAPACITY`: default 1024
    /// - `IDEABOARD_PERSIST_RETRIES`: default 0
    /// - `IDEABOARD_PERSIST_RETRY_BASE_MS`: default 50
    /// - `IDEABOARD_SEED`, `IDEABOARD_SCRIPT`: file paths, unset by default
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a parsed value is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a parsed value is out of range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let engine = EngineConfig {
            debounce_ms: parse_or(lookup("IDEABOARD_DEBOUNCE_MS"), DEFAULT_DEBOUNCE_MS),
            drag_threshold_px: parse_or(lookup("IDEABOARD_DRAG_THRESHOLD_PX"), DEFAULT_DRAG_THRESHOLD_PX),
            min_zoom: parse_or(lookup("IDEABOARD_MIN_ZOOM"), DEFAULT_MIN_ZOOM),
            max_zoom: parse_or(lookup("IDEABOARD_MAX_ZOOM"), DEFAULT_MAX_ZOOM),
            ..EngineConfig::default()
        };
        let persist = PersistConfig {
            queue_capacity: parse_or(lookup("IDEABOARD_PERSIST_QUEUE_CAPACITY"), DEFAULT_PERSIST_QUEUE_CAPACITY),
            retries: parse_or(lookup("IDEABOARD_PERSIST_RETRIES"), DEFAULT_PERSIST_RETRIES),
            retry_base_ms: parse_or(lookup("IDEABOARD_PERSIST_RETRY_BASE_MS"), DEFAULT_PERSIST_RETRY_BASE_MS),
        };

        let config = Self {
            engine,
            persist,
            seed_path: lookup("IDEABOARD_SEED").filter(|v| !v.is_empty()).map(PathBuf::from),
            script_path: lookup("IDEABOARD_SCRIPT").filter(|v| !v.is_empty()).map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        if !(engine.debounce_ms.is_finite() && engine.debounce_ms >= 0.0) {
            return Err(invalid("IDEABOARD_DEBOUNCE_MS", "must be a non-negative number"));
        }
        if !(engine.drag_threshold_px.is_finite() && engine.drag_threshold_px >= 0.0) {
            return Err(invalid("IDEABOARD_DRAG_THRESHOLD_PX", "must be a non-negative number"));
        }
        if !(engine.min_zoom.is_finite() && engine.min_zoom > 0.0) {
            return Err(invalid("IDEABOARD_MIN_ZOOM", "must be greater than zero"));
        }
        if !(engine.max_zoom.is_finite() && engine.max_zoom >= engine.min_zoom) {
            return Err(invalid("IDEABOARD_MAX_ZOOM", "must be at least IDEABOARD_MIN_ZOOM"));
        }
        if self.persist.queue_capacity == 0 {
            return Err(invalid("IDEABOARD_PERSIST_QUEUE_CAPACITY", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                debounce_ms: DEFAULT_DEBOUNCE_MS,
                drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
                min_zoom: DEFAULT_MIN_ZOOM,
                max_zoom: DEFAULT_MAX_ZOOM,
                ..EngineConfig::default()
            },
            persist: PersistConfig::default(),
            seed_path: None,
            script_path: None,
        }
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { key, reason: reason.to_string() }
}

/// Parse a raw setting, falling back to `default` when it is missing or
/// doesn't parse.
pub fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
