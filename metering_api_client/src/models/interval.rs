//! Long-energy (LE) interval records as delivered by the vendor.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One LE record. `timestamp` marks the *end* of the interval.
///
/// Only `timestamp` and `duration` are guaranteed; everything else is
/// device-model dependent (per-channel arrays such as `eReal`, occasional
/// scalars) and is kept untyped, in delivery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongEnergyInterval {
    /// Interval end, epoch seconds UTC.
    pub timestamp: i64,
    /// Covered span in seconds (300 for native LE).
    pub duration: i64,
    /// Remaining payload fields, in delivery order.
    #[serde(flatten)]
    pub extras: IndexMap<String, Value>,
}

impl LongEnergyInterval {
    /// Interval end as a UTC datetime, `None` if the timestamp is outside
    /// chrono's representable range.
    pub fn end_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}
