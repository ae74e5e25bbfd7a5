//! Logging utilities.
//!
//! This module defines log levels and installs the process-wide `tracing`
//! subscriber. Library crates only emit events; binaries call
//! [`init_logging`] once at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV_VAR: &str = "ROSTER_LOG";

/// Severity of a log event, lowest first.
///
/// Config files accept both `warn` and `warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    /// The `EnvFilter` directive for this level.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "warning" {
            return Ok(Self::Warning);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.as_directive() == wanted)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown log level '{}'", s)))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// Configuration for the logging subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// The base log level
    #[serde(default)]
    pub level: LogLevel,

    /// Whether to emit JSON lines instead of human-readable output
    #[serde(default)]
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl LoggingConfig {
    /// Build the filter, preferring `ROSTER_LOG` when it is set.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_directive()))
    }
}

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// # Returns
///
/// * `Ok(())` - If the subscriber was installed.
/// * `Err(ConfigError::Invalid)` - If a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = if config.structured {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| ConfigError::Invalid(format!("logging already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_sort_by_severity() {
        let mut levels = vec![LogLevel::Error, LogLevel::Trace, LogLevel::Info];
        levels.sort();
        assert_eq!(levels, vec![LogLevel::Trace, LogLevel::Info, LogLevel::Error]);
    }

    #[test]
    fn test_parse_level_names() {
        assert_eq!(" Debug ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(ConfigError::Invalid(msg)) if msg.contains("loud")
        ));
    }

    #[test]
    fn test_display_matches_filter_directive() {
        assert_eq!(LogLevel::Warning.to_string(), "warn");
        assert_eq!(
            EnvFilter::new(LogLevel::Trace.as_directive()).to_string(),
            "trace"
        );
    }

    #[test]
    fn test_logging_config_deserialize() {
        let config: LoggingConfig = toml::from_str("level = \"warn\"\nstructured = true").unwrap();
        assert_eq!(config.level, LogLevel::Warning);
        assert!(config.structured);

        let config: LoggingConfig = toml::from_str("").unwrap();
        assert_eq!(config, LoggingConfig::default());
    }
}
