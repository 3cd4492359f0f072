//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;

/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "VEHICLESTORE_LOG_FORMAT";

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name; unknown names fall back to `Pretty`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset.
    pub directive: String,
    /// Optional log file; stderr when `None`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            directive: DEFAULT_LEVEL.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with env overrides.
    ///
    /// `verbose` forces the `debug` level regardless of the configured one.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        let format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .or_else(|| settings.and_then(|s| s.format.clone()))
            .map(|f| LogFormat::parse(&f))
            .unwrap_or_default();

        let directive = if verbose {
            VERBOSE_LEVEL.to_string()
        } else {
            settings
                .and_then(|s| s.level.clone())
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
        };

        Self {
            format,
            directive,
            file: settings.and_then(|s| s.file.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Pretty);
    }

    #[test]
    fn test_from_settings_defaults() {
        let config = LoggingConfig::from_settings(None, false);
        assert_eq!(config.directive, "warn");
        assert!(config.file.is_none());
    }

    #[test]
    fn test_from_settings_uses_level_and_file() {
        let settings = LoggingSettings {
            format: None,
            level: Some("vehiclestore=info".to_string()),
            file: Some(PathBuf::from("/tmp/vehiclestore.log")),
        };
        let config = LoggingConfig::from_settings(Some(&settings), false);

        assert_eq!(config.directive, "vehiclestore=info");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/vehiclestore.log")));
    }

    #[test]
    fn test_verbose_overrides_level() {
        let settings = LoggingSettings {
            level: Some("error".to_string()),
            ..LoggingSettings::default()
        };
        let config = LoggingConfig::from_settings(Some(&settings), true);
        assert_eq!(config.directive, "debug");
    }
}
