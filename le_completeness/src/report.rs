//! Completeness aggregation: fleet scalars and the two report tables.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::fetch::FetchResults;
use crate::grid::ExpectedGrid;
use crate::normalize::NormalizedRow;

/// Fleet-level scalars for one run.
///
/// The status counts are independent predicates over the fetched devices,
/// not a partition: a device with zero observed intervals counts in
/// `num_no_data`, `num_missing_data` and (for any threshold above zero)
/// `num_below_threshold` at the same time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    /// Devices in the working set (successful and failed fetches alike).
    pub num_devices: usize,
    /// Intervals a perfect device delivers over the window.
    pub num_intervals_expected: i64,
    /// Per-day expectation used by the daily table.
    pub num_intervals_expected_per_day: i64,
    /// Threshold the below-threshold bucket was computed with.
    pub threshold_percent: u8,
    /// `sum(observed) / (num_devices * expected) * 100`, zero when the
    /// denominator is zero.
    pub overall_completeness_pct: f64,
    /// Fetched devices that returned zero intervals.
    pub num_no_data: usize,
    /// Fetched devices with at least one missing interval.
    pub num_missing_data: usize,
    /// Fetched devices under the threshold cutoff.
    pub num_below_threshold: usize,
    /// Fetched devices with every expected interval (or more).
    pub num_complete: usize,
    /// Devices whose retrieval failed.
    pub num_failed: usize,
}

/// Whole-period completeness for one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceCompleteness {
    /// Device id.
    pub device_id: String,
    /// Intervals the device delivered.
    pub num_intervals_observed: i64,
    /// Intervals the window expects.
    pub num_intervals_expected: i64,
    /// `expected - observed`, negative on over-delivery (kept unclamped,
    /// it is a bug signal worth surfacing).
    pub num_intervals_missing: i64,
    /// `observed / expected`.
    pub completeness_ratio: f64,
    /// `1 - completeness_ratio`.
    pub missingness_ratio: f64,
}

/// Completeness of one device on one day bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCompleteness {
    /// Device id.
    pub device_id: String,
    /// Day bucket in the run's timezone.
    pub date: NaiveDate,
    /// Intervals whose start instant fell on this date.
    pub num_intervals_observed: i64,
    /// `per_day_expectation - observed`, unclamped.
    pub num_intervals_missing: i64,
    /// `observed / per_day_expectation`.
    pub completeness_ratio: f64,
}

/// The threshold cutoff in intervals: `floor(threshold * expected / 100)`.
///
/// Floor division is deliberate and matches historical reports; at exact
/// percentage boundaries it can sit one interval lower than a rounded rule
/// would.
pub fn threshold_cutoff(threshold_percent: u8, num_intervals_expected: i64) -> i64 {
    i64::from(threshold_percent) * num_intervals_expected / 100
}

/// Computes the fleet scalars over the fetch outcome.
pub fn fleet_summary(
    results: &FetchResults,
    grid: &ExpectedGrid,
    threshold_percent: u8,
) -> FleetSummary {
    let num_devices = results.attempted();
    let cutoff = threshold_cutoff(threshold_percent, grid.total);

    let mut sum_observed: i64 = 0;
    let mut num_no_data = 0;
    let mut num_missing_data = 0;
    let mut num_below_threshold = 0;
    let mut num_complete = 0;
    for intervals in results.intervals.values() {
        let observed = intervals.len() as i64;
        sum_observed += observed;
        if observed == 0 {
            num_no_data += 1;
        }
        if observed < grid.total {
            num_missing_data += 1;
        }
        if observed < cutoff {
            num_below_threshold += 1;
        }
        if observed >= grid.total {
            num_complete += 1;
        }
    }

    let denominator = num_devices as f64 * grid.total as f64;
    let overall_completeness_pct = if denominator > 0.0 {
        sum_observed as f64 / denominator * 100.0
    } else {
        0.0
    };

    FleetSummary {
        num_devices,
        num_intervals_expected: grid.total,
        num_intervals_expected_per_day: grid.per_day,
        threshold_percent,
        overall_completeness_pct,
        num_no_data,
        num_missing_data,
        num_below_threshold,
        num_complete,
        num_failed: results.failures.len(),
    }
}

/// Whole-period table: one row per device that delivered data, worst
/// completeness first, ties broken by device id.
pub fn device_table(results: &FetchResults, grid: &ExpectedGrid) -> Vec<DeviceCompleteness> {
    let mut table: Vec<DeviceCompleteness> = results
        .intervals
        .iter()
        .filter(|(_, intervals)| !intervals.is_empty())
        .map(|(device_id, intervals)| {
            let observed = intervals.len() as i64;
            let ratio = ratio(observed, grid.total);
            DeviceCompleteness {
                device_id: device_id.clone(),
                num_intervals_observed: observed,
                num_intervals_expected: grid.total,
                num_intervals_missing: grid.total - observed,
                completeness_ratio: ratio,
                missingness_ratio: 1.0 - ratio,
            }
        })
        .collect();
    table.sort_by(|a, b| {
        a.completeness_ratio
            .partial_cmp(&b.completeness_ratio)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.device_id.cmp(&b.device_id))
    });
    table
}

/// Daily table: the zero-filled cross product of every fetched device and
/// every day bucket, sorted by device then date.
///
/// Failed devices are absent (there is nothing to bucket); devices that
/// answered with zero intervals still get a row per day.
pub fn daily_table(
    results: &FetchResults,
    rows: &[NormalizedRow],
    grid: &ExpectedGrid,
) -> Vec<DailyCompleteness> {
    let mut counts: HashMap<(&str, NaiveDate), i64> = HashMap::new();
    for row in rows {
        *counts.entry((row.device_id.as_str(), row.start_date)).or_insert(0) += 1;
    }

    let mut device_ids: Vec<&String> = results.intervals.keys().collect();
    device_ids.sort();

    let mut table = Vec::with_capacity(device_ids.len() * grid.days.len());
    for device_id in device_ids {
        for &date in &grid.days {
            let observed = counts.get(&(device_id.as_str(), date)).copied().unwrap_or(0);
            table.push(DailyCompleteness {
                device_id: device_id.clone(),
                date,
                num_intervals_observed: observed,
                num_intervals_missing: grid.per_day - observed,
                completeness_ratio: ratio(observed, grid.per_day),
            });
        }
    }
    table
}

fn ratio(observed: i64, expected: i64) -> f64 {
    if expected > 0 {
        observed as f64 / expected as f64
    } else {
        0.0
    }
}

impl fmt::Display for FleetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "devices:              {}", self.num_devices)?;
        writeln!(
            f,
            "expected intervals:   {} total, {} per day",
            self.num_intervals_expected, self.num_intervals_expected_per_day
        )?;
        writeln!(f, "overall completeness: {:.1}%", self.overall_completeness_pct)?;
        writeln!(f, "no data:              {}", self.num_no_data)?;
        writeln!(f, "missing data:         {}", self.num_missing_data)?;
        writeln!(
            f,
            "below {:>3}%:           {}",
            self.threshold_percent, self.num_below_threshold
        )?;
        writeln!(f, "complete:             {}", self.num_complete)?;
        write!(f, "failed retrieval:     {}", self.num_failed)
    }
}
