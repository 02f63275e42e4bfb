//! # Console Sinks
//!
//! The console half of the sink capability. Log lines go to `line`, reports
//! about failed calls go to `error`. `StdConsole` prints to stdout / stderr;
//! `CapturedConsole` keeps everything in memory so callers can inspect it.

use std::sync::{Mutex, PoisonError};

/// Destination for console output.
pub trait Console: Send + Sync {
    /// Writes one mirrored log line.
    fn line(&self, text: &str);
    /// Writes one error report.
    fn error(&self, text: &str);
}

/// Prints lines to stdout and error reports to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn line(&self, text: &str) {
        println!("{}", text);
    }

    fn error(&self, text: &str) {
        eprintln!("{}", text);
    }
}

/// Which console stream a captured entry was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Regular mirrored lines.
    Out,
    /// Error reports.
    Err,
}

/// Console that records every write in order.
#[derive(Debug, Default)]
pub struct CapturedConsole {
    entries: Mutex<Vec<(Stream, String)>>,
}

impl CapturedConsole {
    /// Creates an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, in order.
    pub fn entries(&self) -> Vec<(Stream, String)> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Mirrored log lines only.
    pub fn lines(&self) -> Vec<String> {
        self.filtered(Stream::Out)
    }

    /// Error reports only.
    pub fn errors(&self) -> Vec<String> {
        self.filtered(Stream::Err)
    }

    /// Drops everything captured so far.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn filtered(&self, stream: Stream) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn push(&self, stream: Stream, text: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((stream, text.to_string()));
    }
}

impl Console for CapturedConsole {
    fn line(&self, text: &str) {
        self.push(Stream::Out, text);
    }

    fn error(&self, text: &str) {
        self.push(Stream::Err, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_console_separates_streams() {
        let console = CapturedConsole::new();
        console.line("one");
        console.error("oops");
        console.line("two");
        assert_eq!(console.lines(), vec!["one", "two"]);
        assert_eq!(console.errors(), vec!["oops"]);
        assert_eq!(console.entries().len(), 3);
        console.clear();
        assert!(console.entries().is_empty());
    }
}
