//! Utility functions and types.
//!
//! This module provides logging setup, configuration loading and the
//! revision counter used to version persisted definitions.

pub mod config;
pub mod logging;
pub mod version;

pub use config::RosterConfig;
pub use logging::{init_logging, LogLevel, LoggingConfig};
pub use version::Revision;
