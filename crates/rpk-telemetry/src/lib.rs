//! RPK Telemetry - Structured logging setup for rpk binaries
//!
//! Installs a global `tracing` subscriber with an `EnvFilter` and either a
//! JSON or a human-readable fmt layer. Logs go to stderr so that stdout stays
//! free for command output.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rpk_telemetry::{TelemetryConfig, init_telemetry};
//!
//! init_telemetry(TelemetryConfig::from_env()?)?;
//!
//! tracing::info!(limiter = "debounce", "Starting replay");
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod logging;

pub use logging::*;

use std::sync::OnceLock;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "RPK_LOG";

/// Environment variable switching JSON output on or off.
pub const LOG_JSON_ENV: &str = "RPK_LOG_JSON";

/// Configuration the global subscriber was installed with.
static TELEMETRY: OnceLock<TelemetryConfig> = OnceLock::new();

/// Configuration for telemetry initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line.
    pub service_name: String,

    /// Log level filter (e.g., "info", "`rpk_ratelimit=debug`").
    pub log_level: String,

    /// Enable JSON log output.
    pub json_logs: bool,

    /// Colorize human-readable output.
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "rpk".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Create a new configuration with the given service name.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable or disable JSON logs.
    #[must_use]
    pub const fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub const fn with_ansi(mut self, enabled: bool) -> Self {
        self.ansi = enabled;
        self
    }

    /// Read `RPK_LOG` and `RPK_LOG_JSON` over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `RPK_LOG_JSON` is not a recognized boolean.
    pub fn from_env() -> Result<Self, TelemetryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON switch is not a recognized boolean.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TelemetryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(level) = lookup(LOG_ENV).filter(|level| !level.trim().is_empty()) {
            config.log_level = level;
        }
        if let Some(raw) = lookup(LOG_JSON_ENV) {
            config.json_logs = parse_bool(&raw).ok_or_else(|| {
                TelemetryError::Config(format!("{LOG_JSON_ENV} must be a boolean, got {raw:?}"))
            })?;
        }
        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Initialize the telemetry system.
///
/// This should be called once at startup. Later calls fail because the
/// global subscriber is already set.
///
/// # Errors
///
/// Returns an error if the log filter is invalid or a global subscriber is
/// already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(&config)?;
    tracing::debug!(
        service = %config.service_name,
        json = config.json_logs,
        "Telemetry initialized"
    );
    let _ = TELEMETRY.set(config);
    Ok(())
}

/// Configuration of the installed subscriber, if any.
#[must_use]
pub fn active_config() -> Option<&'static TelemetryConfig> {
    TELEMETRY.get()
}

/// Telemetry error type.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_telemetry_config_default() {
        let config = TelemetryConfig::default();

        assert_eq!(config.service_name, "rpk");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
        assert!(config.ansi);
    }

    #[test]
    fn test_telemetry_config_builder_chain() {
        let config = TelemetryConfig::new("rpk-sim")
            .with_log_level("rpk_ratelimit=trace")
            .with_json_logs(true)
            .with_ansi(false);

        assert_eq!(config.service_name, "rpk-sim");
        assert_eq!(config.log_level, "rpk_ratelimit=trace");
        assert!(config.json_logs);
        assert!(!config.ansi);
    }

    #[test]
    fn test_from_env_defaults_when_unset() {
        let config = TelemetryConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    fn test_from_env_reads_level_and_json() {
        let config =
            TelemetryConfig::from_lookup(env(&[("RPK_LOG", "debug"), ("RPK_LOG_JSON", "TRUE")]))
                .unwrap();

        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
    }

    #[test]
    fn test_from_env_ignores_blank_level() {
        let config = TelemetryConfig::from_lookup(env(&[("RPK_LOG", "  ")])).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_from_env_rejects_bad_json_flag() {
        let err = TelemetryConfig::from_lookup(env(&[("RPK_LOG_JSON", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("RPK_LOG_JSON must be a boolean"));
    }

    #[test]
    fn test_telemetry_error_display() {
        let error = TelemetryError::LoggingInit("test error".to_string());
        let error_str = format!("{error}");

        assert!(error_str.contains("Failed to initialize logging"));
        assert!(error_str.contains("test error"));
    }
}
