//! # lib_loggr
//!
//! A per-process logger that writes severity-tagged lines to
//! `root/YYYY/MM/DD/<severity>.log`, always copies them to `event.log`, mirrors
//! them to the console with a colored severity prefix, and rolls over to a new
//! day directory at local midnight.
//!
//! Modules are feature gated the same way across the workspace:
//! `utils`, `configs` and `loggers` (the default, which pulls in the other two).

#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "utils")]
pub mod utils;

// Re-export the everyday surface.
#[cfg(feature = "configs")]
pub use configs::{load_options, ConfigError, LoggrOptions, StyleSpec};
#[cfg(feature = "loggers")]
pub use loggers::{
    CapturedConsole, Console, ConsoleStyle, Format, IntoLogArgs, LogArgs, Loggr, LoggrError,
    Severity, StdConsole,
};
#[cfg(feature = "utils")]
pub use utils::{format_elapsed, format_timestamp, Clock, ManualClock, SystemClock};

#[cfg(feature = "loggers")]
pub use colored::Color;
