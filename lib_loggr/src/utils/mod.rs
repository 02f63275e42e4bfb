//! # Utilities Module
//!
//! General-purpose helpers shared by the configuration layer and the loggers:
//!
//! - **`timestamp`**: renders the `MM/DD/YYYY @ hh:mm:ss:mmm AM|PM` stamp.
//! - **`clock`**: the [`Clock`] trait plus system and manual implementations.
//! - **`process`**: executable location and the default log root.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Clock sources used to decide timestamps and day boundaries.
pub mod clock;
/// Process location helpers.
pub mod process;
/// Log line timestamp formatting.
pub mod timestamp;

pub use clock::{Clock, ManualClock, SystemClock};
pub use process::default_log_root;
pub use timestamp::{format_elapsed, format_timestamp};
