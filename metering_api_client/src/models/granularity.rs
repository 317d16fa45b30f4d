//! LE granularities and the per-request window limits they impose.
//!
//! The vendor caps how much data a single long-energy request may cover,
//! and the cap depends on the reporting granularity. Longer windows have
//! to be split into consecutive batches before being sent.

use std::fmt;

use serde::{Deserialize, Serialize};

const SECS_PER_DAY: i64 = 24 * 3600;

/// Reporting granularity accepted by the long-energy endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// Native 5-minute intervals.
    #[serde(rename = "5m")]
    FiveMins,
    /// 15-minute rollup.
    #[serde(rename = "15m")]
    FifteenMins,
    /// 30-minute rollup.
    #[serde(rename = "30m")]
    ThirtyMins,
    /// Hourly rollup.
    #[serde(rename = "hour")]
    Hour,
    /// Daily rollup.
    #[serde(rename = "day")]
    Day,
    /// Weekly rollup.
    #[serde(rename = "week")]
    Week,
    /// Monthly rollup.
    #[serde(rename = "month")]
    Month,
}

impl Granularity {
    /// Wire code used in query parameters.
    pub fn code(&self) -> &'static str {
        match self {
            Granularity::FiveMins => "5m",
            Granularity::FifteenMins => "15m",
            Granularity::ThirtyMins => "30m",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// Longest span (in seconds) a single request may cover at this
    /// granularity.
    pub fn max_span_secs(&self) -> i64 {
        let days = match self {
            Granularity::FiveMins => 7,
            Granularity::FifteenMins => 14,
            Granularity::ThirtyMins => 31,
            Granularity::Hour => 90,
            Granularity::Day => 3 * 365,
            Granularity::Week => 5 * 365,
            Granularity::Month => 10 * 365,
        };
        days * SECS_PER_DAY
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One batch of a larger request window, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    /// Batch start (inclusive).
    pub timestamp_start: i64,
    /// Batch end, capped at the window end.
    pub timestamp_end: i64,
}

/// Splits `[timestamp_start, timestamp_end)` into consecutive spans no
/// longer than the per-request maximum for `granularity`.
///
/// The final span ends exactly at `timestamp_end`, so it may be shorter
/// than the maximum. An empty or inverted window yields no spans.
pub fn batch_spans(granularity: Granularity, timestamp_start: i64, timestamp_end: i64) -> Vec<TimeSpan> {
    let max_span = granularity.max_span_secs();
    let mut spans = Vec::new();
    let mut batch_start = timestamp_start;
    while batch_start < timestamp_end {
        spans.push(TimeSpan {
            timestamp_start: batch_start,
            timestamp_end: (batch_start + max_span).min(timestamp_end),
        });
        batch_start += max_span;
    }
    spans
}
