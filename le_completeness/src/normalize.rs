//! Flattening of raw LE records into tabular rows.
//!
//! Each record becomes one row tagged with its owning device id.
//! List-valued payload fields are exploded into indexed scalar columns
//! (`eReal` -> `eReal_0`, `eReal_1`, ...); field sets may differ between
//! devices and firmware versions, so the table carries the union of all
//! observed columns with an explicit null for anything a row lacks.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use indexmap::{IndexMap, IndexSet};
use metering_api_client::models::interval::LongEnergyInterval;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// One flattened LE record.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// Owning device.
    pub device_id: String,
    /// Interval end, epoch seconds UTC.
    pub timestamp: i64,
    /// Covered span in seconds, as reported by the device.
    pub duration_secs: i64,
    /// Interval start in the configured timezone.
    pub start_local: DateTime<Tz>,
    /// Interval end in the configured timezone.
    pub end_local: DateTime<Tz>,
    /// Day bucket: the calendar date of `start_local`.
    pub start_date: NaiveDate,
    /// Exploded payload fields, original key order.
    pub extras: IndexMap<String, Value>,
}

/// Column-oriented view over a set of [`NormalizedRow`]s.
///
/// Column order is `device_id`, `timestamp`, `duration_secs`, then the
/// union of payload columns in first-seen order. Cells a row has no value
/// for hold [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowTable {
    /// Column names.
    pub columns: Vec<String>,
    /// Row cells, aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

/// Flattens every fetched interval into a row, in mapping order per device
/// and delivery order within a device.
///
/// The interval start is `timestamp - interval_secs` with the configured
/// duration, not the record's own `duration` field, so day buckets stay on
/// the same grid the expectation is computed from. Records whose
/// timestamps fall outside the representable range are dropped with a
/// warning.
pub fn normalize_intervals(
    intervals_by_device: &IndexMap<String, Vec<LongEnergyInterval>>,
    tz: Tz,
    interval_secs: i64,
) -> Vec<NormalizedRow> {
    let mut rows = Vec::new();
    for (device_id, intervals) in intervals_by_device {
        for interval in intervals {
            let start_utc = interval
                .timestamp
                .checked_sub(interval_secs)
                .and_then(|ts| DateTime::from_timestamp(ts, 0));
            let (Some(start_utc), Some(end_utc)) = (start_utc, interval.end_utc()) else {
                warn!(
                    device_id = %device_id,
                    timestamp = interval.timestamp,
                    "dropping interval with unrepresentable timestamp"
                );
                continue;
            };
            let start_local = start_utc.with_timezone(&tz);
            rows.push(NormalizedRow {
                device_id: device_id.clone(),
                timestamp: interval.timestamp,
                duration_secs: interval.duration,
                start_date: start_local.date_naive(),
                start_local,
                end_local: end_utc.with_timezone(&tz),
                extras: explode_extras(&interval.extras),
            });
        }
    }
    rows
}

/// Builds the column-aligned table for the normalized rows.
pub fn row_table(rows: &[NormalizedRow]) -> RowTable {
    let mut payload_columns: IndexSet<String> = IndexSet::new();
    for row in rows {
        for key in row.extras.keys() {
            if !payload_columns.contains(key) {
                payload_columns.insert(key.clone());
            }
        }
    }

    let mut columns = vec![
        "device_id".to_string(),
        "timestamp".to_string(),
        "duration_secs".to_string(),
    ];
    columns.extend(payload_columns.iter().cloned());

    let table_rows = rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(columns.len());
            cells.push(Value::String(row.device_id.clone()));
            cells.push(Value::from(row.timestamp));
            cells.push(Value::from(row.duration_secs));
            for key in &payload_columns {
                cells.push(row.extras.get(key).cloned().unwrap_or(Value::Null));
            }
            cells
        })
        .collect();

    RowTable { columns, rows: table_rows }
}

fn explode_extras(extras: &IndexMap<String, Value>) -> IndexMap<String, Value> {
    let mut exploded = IndexMap::new();
    for (key, value) in extras {
        match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    exploded.insert(format!("{key}_{i}"), item.clone());
                }
            }
            other => {
                exploded.insert(key.clone(), other.clone());
            }
        }
    }
    exploded
}
