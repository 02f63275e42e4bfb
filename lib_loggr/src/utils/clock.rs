//! # Clock Sources
//!
//! The dispatch engine never calls `Local::now()` directly. It asks a [`Clock`],
//! which lets the midnight boundary be driven deterministically in tests.

use chrono::{DateTime, Local, TimeDelta};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use super::timestamp::at_offset;

/// A source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> DateTime<Local>;
}

/// # System Clock
///
/// Captures the wall time once at construction and measures everything after
/// it on the monotonic clock, so timestamps never run backwards if the system
/// time is adjusted while the process runs.
#[derive(Debug, Clone)]
pub struct SystemClock {
    started_at: DateTime<Local>,
    started: Instant,
}

impl SystemClock {
    /// Creates a clock anchored at the current moment.
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            started: Instant::now(),
        }
    }

    /// Wall time captured when the clock was created.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        at_offset(&self.started_at, self.started.elapsed())
    }
}

/// # Manual Clock
///
/// A settable clock. With a non-zero step every reading advances the clock,
/// which makes successive reads observably distinct.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Local>>,
    step: TimeDelta,
}

impl ManualClock {
    /// Creates a clock frozen at `at`.
    pub fn new(at: DateTime<Local>) -> Self {
        Self::with_step(at, TimeDelta::zero())
    }

    /// Creates a clock starting at `at` that moves forward by `step` after each read.
    pub fn with_step(at: DateTime<Local>, step: TimeDelta) -> Self {
        Self {
            current: Mutex::new(at),
            step,
        }
    }

    /// Moves the clock to `at`.
    pub fn set(&self, at: DateTime<Local>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += delta;
    }

    /// Reads the clock without stepping it.
    pub fn peek(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let reading = *current;
        *current += self.step;
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_is_monotonic_from_start() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(first >= clock.started_at());
        assert!(second >= first);
    }

    #[test]
    fn test_manual_clock_steps_after_each_read() {
        let start = Local.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::with_step(start, TimeDelta::milliseconds(5));
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + TimeDelta::milliseconds(5));
        assert_eq!(clock.peek(), start + TimeDelta::milliseconds(10));
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let start = Local.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(TimeDelta::hours(2));
        assert_eq!(clock.now(), start + TimeDelta::hours(2));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
