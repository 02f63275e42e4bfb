//! # Loggers
//!
//! The severity logger: a registry of severities and their console styles, a
//! manager for the daily `root/YYYY/MM/DD/` sink directories, and the
//! dispatch engine that renders each call and fans it out to the console and
//! the file sinks, rotating at local midnight.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Console sinks.
pub mod console;
/// Call resolution, rendering, rotation latch and fan-out.
pub mod dispatch;
/// Error taxonomy.
pub mod error;
/// The `Loggr` facade.
pub mod loggr;
/// Severity registry and console styles.
pub mod severity;
/// Daily directories and file sinks.
pub mod sinks;

pub use console::{CapturedConsole, Console, StdConsole};
pub use dispatch::{Dispatcher, Format, IntoLogArgs, LogArgs, LogEvent, Target};
pub use error::LoggrError;
pub use loggr::{Loggr, Recolor};
pub use severity::{ConsoleStyle, Severity, SeverityRegistry};
pub use sinks::{SinkDirectoryManager, SinkSet};
