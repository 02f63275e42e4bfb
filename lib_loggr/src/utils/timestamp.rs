//! # Timestamp Formatter
//!
//! Renders the calendar stamp that opens every log line:
//! `MM/DD/YYYY @ hh:mm:ss:mmm AM|PM`.
//!
//! The clock is 12-hour with an explicit period. Midnight and noon both render
//! as `12`, afternoon hours are reduced by twelve, and every field is zero
//! padded (three digits for milliseconds).

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use std::fmt::Display;
use std::time::Duration;

/// `strftime` pattern behind [`format_timestamp`]. `%I` already folds hours
/// 0 and 12 onto `12`, and `%3f` is the zero-padded millisecond field.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y @ %I:%M:%S:%3f %p";

/// Formats an absolute moment as a log timestamp.
pub fn format_timestamp<Tz>(moment: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    moment.format(TIMESTAMP_FORMAT).to_string()
}

/// Resolves an offset from process start into a wall-clock moment.
///
/// An offset too large to represent leaves the start time unchanged.
pub fn at_offset(started_at: &DateTime<Local>, elapsed: Duration) -> DateTime<Local> {
    TimeDelta::from_std(elapsed)
        .ok()
        .and_then(|offset| started_at.checked_add_signed(offset))
        .unwrap_or(*started_at)
}

/// # Format Elapsed
///
/// Formats the moment `elapsed` after `started_at`. This is the formatter's
/// primary form: the logger keeps the wall time of process start and measures
/// everything after it on a monotonic clock.
///
/// # Arguments
/// * `started_at` - Wall-clock time captured when the process (or clock) started.
/// * `elapsed` - Monotonic time elapsed since then.
pub fn format_elapsed(started_at: &DateTime<Local>, elapsed: Duration) -> String {
    format_timestamp(&at_offset(started_at, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn utc_at(h: u32, m: u32, s: u32, ms: u32) -> DateTime<FixedOffset> {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap();
        FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(&naive)
            .unwrap()
    }

    #[test]
    fn test_midnight_renders_as_twelve_am() {
        assert_eq!(format_timestamp(&utc_at(0, 5, 9, 7)), "03/07/2024 @ 12:05:09:007 AM");
    }

    #[test]
    fn test_noon_renders_as_twelve_pm() {
        assert_eq!(format_timestamp(&utc_at(12, 0, 0, 0)), "03/07/2024 @ 12:00:00:000 PM");
    }

    #[test]
    fn test_afternoon_hours_reduce_by_twelve() {
        assert_eq!(format_timestamp(&utc_at(13, 4, 59, 120)), "03/07/2024 @ 01:04:59:120 PM");
        assert_eq!(format_timestamp(&utc_at(23, 59, 59, 999)), "03/07/2024 @ 11:59:59:999 PM");
    }

    #[test]
    fn test_morning_hours_keep_padding() {
        assert_eq!(format_timestamp(&utc_at(9, 30, 1, 45)), "03/07/2024 @ 09:30:01:045 AM");
    }

    #[test]
    fn test_format_elapsed_adds_offset_to_start() {
        let start = Local.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let stamp = format_elapsed(&start, Duration::from_millis(61_250));
        assert_eq!(stamp, "06/01/2024 @ 10:01:01:250 AM");
    }
}
