//! # Project Test Helpers
//!
//! Shared setup for the end-to-end tests: a `Loggr` rooted in a temporary
//! directory, driven by a `ManualClock` and writing to a `CapturedConsole`.

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use lib_loggr::{CapturedConsole, Loggr, LoggrOptions, ManualClock};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A started logger plus the handles needed to inspect it.
pub struct Harness {
    /// Log root. Removed when the harness is dropped.
    pub root: TempDir,
    /// Clock the logger reads.
    pub clock: Arc<ManualClock>,
    /// Everything the logger printed.
    pub console: Arc<CapturedConsole>,
    /// The logger under test.
    pub loggr: Loggr,
}

impl Harness {
    /// Starts a logger whose clock is frozen at `at`.
    pub async fn start_at(at: DateTime<Local>) -> Self {
        Self::start_stepping(at, TimeDelta::zero()).await
    }

    /// Starts a logger whose clock advances by `step` on every read.
    pub async fn start_stepping(at: DateTime<Local>, step: TimeDelta) -> Self {
        // Console assertions expect escape codes even without a terminal.
        colored::control::set_override(true);
        let root = tempfile::tempdir().expect("Failed to create temporary log root");
        let clock = Arc::new(ManualClock::with_step(at, step));
        let console = Arc::new(CapturedConsole::new());
        let loggr = Loggr::start_with(
            LoggrOptions::with_root(root.path()),
            clock.clone(),
            console.clone(),
        )
        .await;
        Self {
            root,
            clock,
            console,
            loggr,
        }
    }

    /// Directory for one calendar day under the root.
    pub fn day_dir(&self, year: i32, month: u32, day: u32) -> PathBuf {
        day_path(self.root.path(), year, month, day)
    }

    /// Contents of `<name>.log` in the currently installed directory.
    pub fn read(&self, name: &str) -> String {
        let dir = self.loggr.current_dir().expect("Logger has no open directory");
        read_log(&dir, name).unwrap_or_default()
    }
}

/// `root/YYYY/MM/DD`.
pub fn day_path(root: &Path, year: i32, month: u32, day: u32) -> PathBuf {
    root.join(format!("{:04}", year))
        .join(format!("{:02}", month))
        .join(format!("{:02}", day))
}

/// Reads `dir/<name>.log`, `None` if it does not exist.
pub fn read_log(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(format!("{}.log", name))).ok()
}

/// Local time with milliseconds.
pub fn local(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32, ms: i64) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .expect("Ambiguous or missing local time in test fixture")
        + TimeDelta::milliseconds(ms)
}

/// Removes ANSI color sequences.
pub fn strip_ansi(text: &str) -> String {
    let re = Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex");
    re.replace_all(text, "").into_owned()
}
