//! Time utilities for business-timezone conversion
//!
//! Reservation `date` and `time` columns are stored as text in the
//! business timezone; they are combined into a UTC instant only where
//! the late-cancellation window is evaluated.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Cancelling inside this window before the reservation costs points
pub const LATE_CANCEL_WINDOW_HOURS: i64 = 2;

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a time string (HH:MM)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {}", time)))
}

/// Combine stored date + time strings into a UTC instant (business timezone)
///
/// DST gap fallback: if the local time does not exist, fall back to UTC.
/// Returns None when either string fails to parse.
pub fn combine_date_time(date: &str, time: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    let naive = date.and_time(time);
    let instant = naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc());
    Some(instant)
}

/// Whether a cancellation at `now` falls inside the penalty window:
/// the reservation is still in the future but less than two hours away.
pub fn is_late_cancellation(scheduled: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    scheduled > now && scheduled - now < Duration::hours(LATE_CANCEL_WINDOW_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_and_time() {
        assert!(parse_date("2026-03-15").is_ok());
        assert!(parse_date("15/03/2026").is_err());
        assert!(parse_time("19:30").is_ok());
        assert!(parse_time("7pm").is_err());
    }

    #[test]
    fn test_combine_date_time_utc() {
        let instant = combine_date_time("2026-03-15", "19:30", chrono_tz::UTC).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 3, 15, 19, 30, 0).unwrap());
    }

    #[test]
    fn test_combine_date_time_offset() {
        // Athens is UTC+2 in winter
        let instant =
            combine_date_time("2026-01-15", "20:00", chrono_tz::Europe::Athens).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 1, 15, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_combine_rejects_garbage() {
        assert!(combine_date_time("someday", "19:30", chrono_tz::UTC).is_none());
        assert!(combine_date_time("2026-01-15", "soon", chrono_tz::UTC).is_none());
    }

    #[test]
    fn test_late_cancellation_window() {
        let scheduled = Utc.with_ymd_and_hms(2026, 3, 15, 20, 0, 0).unwrap();

        // 90 minutes before: inside the window
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 18, 30, 0).unwrap();
        assert!(is_late_cancellation(scheduled, now));

        // Exactly 2 hours before: outside
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 18, 0, 0).unwrap();
        assert!(!is_late_cancellation(scheduled, now));

        // 3 hours before: outside
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 17, 0, 0).unwrap();
        assert!(!is_late_cancellation(scheduled, now));

        // Already past: no penalty
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 20, 30, 0).unwrap();
        assert!(!is_late_cancellation(scheduled, now));
    }
}
