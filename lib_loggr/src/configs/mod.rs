//! # Configuration Modules
//!
//! Options for the logger and the loaders that read them from disk.

/// `LoggrOptions`, color specs and the JSON / JSON5 file loader.
pub mod config_loggr;

pub use config_loggr::{load_options, ConfigError, LoggrOptions, StyleSpec};
