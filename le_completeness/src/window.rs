//! Civil-date windows resolved to absolute fetch instants.
//!
//! What this module provides:
//! - [`start_of_day_utc`]: the first instant of a calendar day in an IANA
//!   time zone, with deterministic DST handling (ambiguous midnights take
//!   the earlier offset; midnights inside a spring-forward gap shift
//!   forward to the first valid wall time).
//! - [`TimeWindow`]: an absolute `[start, end)` window built from inclusive
//!   civil dates. Both bounds are pushed forward by one interval duration
//!   because LE timestamps mark the *end* of an interval: the interval
//!   covering `[00:00, 00:05)` local carries the timestamp `00:05`.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Failures resolving civil dates to instants.
#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    /// `date_start` is after `date_end`.
    #[error("empty window: {start} ..= {end}")]
    Empty {
        /// Configured start date.
        start: NaiveDate,
        /// Configured end date.
        end: NaiveDate,
    },

    /// A date at the edge of chrono's supported range.
    #[error("date {0} is out of the supported range")]
    DateOutOfRange(NaiveDate),

    /// No valid start-of-day instant exists (pathological zone data).
    #[error("{date} has no representable start of day in {tz}")]
    StartOfDay {
        /// The day being resolved.
        date: NaiveDate,
        /// The zone it was resolved in.
        tz: Tz,
    },
}

/// First instant of `date` in `tz`, as UTC.
///
/// Behavior on DST edges:
/// - an ambiguous midnight (fall-back) resolves to the earlier instant,
/// - a nonexistent midnight (spring-forward gap, e.g. America/Santiago)
///   shifts forward minute-by-minute to the first valid wall time,
///   capped at 2 hours.
pub fn start_of_day_utc(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, WindowError> {
    use chrono::offset::LocalResult::*;

    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        Single(dt) => Ok(dt.with_timezone(&Utc)),
        Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        None => {
            let mut t = midnight;
            for _ in 0..120 {
                t += Duration::minutes(1);
                if let Single(dt) = tz.from_local_datetime(&t) {
                    return Ok(dt.with_timezone(&Utc));
                }
            }
            Err(WindowError::StartOfDay { date, tz })
        }
    }
}

/// An absolute fetch window plus the timezone it was derived in.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
}

impl TimeWindow {
    /// Builds the window for the inclusive civil dates
    /// `date_start ..= date_end`, shifting both bounds forward by
    /// `interval_secs` (end-of-interval timestamp convention).
    pub fn from_civil_dates(
        date_start: NaiveDate,
        date_end: NaiveDate,
        tz: Tz,
        interval_secs: i64,
    ) -> Result<Self, WindowError> {
        if date_start > date_end {
            return Err(WindowError::Empty { start: date_start, end: date_end });
        }
        let day_after_end = date_end
            .succ_opt()
            .ok_or(WindowError::DateOutOfRange(date_end))?;

        let offset = Duration::seconds(interval_secs);
        let start = start_of_day_utc(date_start, tz)? + offset;
        let end = start_of_day_utc(day_after_end, tz)? + offset;
        Ok(Self { start, end, tz })
    }

    /// Window start (inclusive), UTC.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Window end (exclusive), UTC.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The timezone day buckets are defined in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Window start as epoch seconds, for the fetch layer.
    pub fn timestamp_start(&self) -> i64 {
        self.start.timestamp()
    }

    /// Window end as epoch seconds, for the fetch layer.
    pub fn timestamp_end(&self) -> i64 {
        self.end.timestamp()
    }
}
