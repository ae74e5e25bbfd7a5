//! Configuration for Roster tools.
//!
//! Handles loading the configuration file that names the catalog sources and
//! the data directory used by file-backed stores.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::logging::LoggingConfig;
use crate::error::ConfigError;

/// Default configuration file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "roster.toml";

/// Roster configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Directory holding persisted role and dashboard records
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Capability catalog file (JSON or TOML)
    #[serde(default = "default_capability_catalog")]
    pub capability_catalog: PathBuf,

    /// Scope catalog file; the built-in catalog is used when absent
    #[serde(default)]
    pub scope_catalog: Option<PathBuf>,

    /// Menu catalog file; dashboards can only use menu entries it lists
    #[serde(default)]
    pub menu_catalog: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./roster-data")
}

fn default_capability_catalog() -> PathBuf {
    PathBuf::from("./capabilities.toml")
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            capability_catalog: default_capability_catalog(),
            scope_catalog: None,
            menu_catalog: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl RosterConfig {
    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults. Relative catalog paths and the
    /// data directory are resolved against the configuration file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = RosterConfig::default();

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());

            if !path.exists() {
                warn!("Configuration file not found: {}", path.display());
                return Ok(config);
            }

            let content = std::fs::read_to_string(path).context(format!(
                "Failed to read configuration file: {}",
                path.display()
            ))?;

            config = Self::parse(&content, path)?;

            if let Some(base) = path.parent() {
                config.resolve_relative_to(base);
            }
        } else {
            info!("No configuration file specified, using defaults");
        }

        config.validate()?;

        Ok(config)
    }

    /// Parse configuration text, choosing the format by file extension.
    fn parse(content: &str, path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            serde_json::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
        } else {
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
        };

        parsed.context(format!(
            "Failed to parse configuration file: {}",
            path.display()
        ))
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        resolve(&mut self.data_dir);
        resolve(&mut self.capability_catalog);
        if let Some(p) = self.scope_catalog.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.menu_catalog.as_mut() {
            resolve(p);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "Data directory cannot be empty".to_string(),
            ));
        }

        if self.capability_catalog.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "Capability catalog path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
