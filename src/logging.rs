//! Logging System
//!
//! Structured logging via the `tracing` crate. Diagnostic output goes to
//! stderr so the run summary on stdout stays machine-consumable. Level and
//! format can be overridden through `GRAFT_LOG` and `GRAFT_LOG_FORMAT`.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system
///
/// Priority order (highest to lowest): GRAFT_LOG environment variable,
/// `--debug` flag, configuration file, defaults.
pub fn init_logging(config: &LoggingConfig, debug: bool) -> Result<(), SyncError> {
    if !config.enabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(|| std::io::sink()))
            .init();
        return Ok(());
    }

    let filter = build_env_filter(config, debug)?;
    let format = determine_format(config)?;

    if format == "json" {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

/// Build environment filter from config, the debug flag, or environment
fn build_env_filter(config: &LoggingConfig, debug: bool) -> Result<EnvFilter, SyncError> {
    if let Ok(filter) = EnvFilter::try_from_env("GRAFT_LOG") {
        return Ok(filter);
    }
    let level = if debug { "debug" } else { config.level.as_str() };
    EnvFilter::try_new(level).map_err(|e| SyncError::Config(format!("Invalid log level: {}", e)))
}

/// Determine output format from config or environment
fn determine_format(config: &LoggingConfig) -> Result<String, SyncError> {
    if let Ok(format) = std::env::var("GRAFT_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    if config.format != "json" && config.format != "text" {
        return Err(SyncError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            config.format
        )));
    }

    Ok(config.format.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "text");
        assert!(config.color);
    }

    #[test]
    fn test_debug_flag_raises_level() {
        let config = LoggingConfig::default();
        let filter = build_env_filter(&config, true).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_config_level_used_without_debug() {
        let mut config = LoggingConfig::default();
        config.level = "warn".to_string();
        let filter = build_env_filter(&config, false).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_determine_format_rejects_unknown() {
        let mut config = LoggingConfig::default();
        config.format = "yaml".to_string();
        assert!(determine_format(&config).is_err());
    }
}
