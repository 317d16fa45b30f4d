//! Expected-delivery grids: how many intervals a perfect device sends.
//!
//! Two expectations are derived from a window:
//! - a whole-period total, following real elapsed time (floor division of
//!   the window span by the interval duration),
//! - a fixed per-day count of `86400 / interval` (288 for 5-minute LE),
//!   applied to every day bucket regardless of DST-short or -long days.
//!
//! On a DST-transition day the two deliberately disagree: devices report on
//! real elapsed time, so a 23-hour day genuinely delivers fewer intervals,
//! while the per-day yardstick stays constant. Tests pin this divergence
//! down rather than hiding it.

use chrono::{Duration, NaiveDate};

use crate::window::{TimeWindow, WindowError, start_of_day_utc};

/// Seconds covered by one native LE interval.
pub const INTERVAL_DURATION_SECS: i64 = 300;

/// Seconds per civil day.
pub const SECS_PER_DAY: i64 = 24 * 3600;

/// The delivery expectation for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedGrid {
    /// Intervals a perfect device delivers over the whole window.
    pub total: i64,
    /// Per-day expectation, constant across buckets.
    pub per_day: i64,
    /// Civil day buckets covered by the window, ascending.
    pub days: Vec<NaiveDate>,
}

/// Computes the expected grid for `window` at `interval_secs` cadence.
pub fn expected_grid(window: &TimeWindow, interval_secs: i64) -> Result<ExpectedGrid, WindowError> {
    Ok(ExpectedGrid {
        total: (window.timestamp_end() - window.timestamp_start()) / interval_secs,
        per_day: SECS_PER_DAY / interval_secs,
        days: day_buckets(window, interval_secs)?,
    })
}

/// Enumerates the window's day buckets in the window's timezone.
///
/// A day is covered while its first interval (the one *ending* at
/// `00:00 local + interval`) still ends strictly before the window end, so
/// a trailing day touched only by the window's end boundary is excluded.
fn day_buckets(window: &TimeWindow, interval_secs: i64) -> Result<Vec<NaiveDate>, WindowError> {
    let tz = window.timezone();
    let mut days = Vec::new();
    let mut day = window.start().with_timezone(&tz).date_naive();
    loop {
        let first_interval_end = start_of_day_utc(day, tz)? + Duration::seconds(interval_secs);
        if first_interval_end >= window.end() {
            break;
        }
        days.push(day);
        day = day.succ_opt().ok_or(WindowError::DateOutOfRange(day))?;
    }
    Ok(days)
}
