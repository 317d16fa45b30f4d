//! Per-device interval retrieval over a run window.

use indexmap::IndexMap;
use metering_api_client::models::interval::LongEnergyInterval;
use metering_api_client::source::LongEnergySource;
use tracing::{info, warn};

use crate::window::TimeWindow;

/// Retrieval outcome for the whole working set.
///
/// Both maps keep fetch order. A device that answered with zero intervals
/// still gets an (empty) entry in `intervals`; a device whose retrieval
/// failed appears only in `failures`.
#[derive(Debug, Default)]
pub struct FetchResults {
    /// Intervals per successfully fetched device.
    pub intervals: IndexMap<String, Vec<LongEnergyInterval>>,
    /// Error text per device whose retrieval failed.
    pub failures: IndexMap<String, String>,
}

impl FetchResults {
    /// Devices attempted, successful or not.
    pub fn attempted(&self) -> usize {
        self.intervals.len() + self.failures.len()
    }
}

/// Fetches LE intervals for every device in `ids`, one device at a time.
///
/// Request pacing lives in the source, not here. A failing device is
/// recorded and the remaining devices are still fetched. Duplicate ids are
/// fetched once; later occurrences are skipped.
pub async fn fetch_intervals(
    source: &dyn LongEnergySource,
    ids: &[String],
    window: &TimeWindow,
) -> FetchResults {
    let mut results = FetchResults::default();
    let total = ids.len();
    for (position, id) in ids.iter().enumerate() {
        if results.intervals.contains_key(id) || results.failures.contains_key(id) {
            continue;
        }
        match source
            .load_long_energy(id, window.timestamp_start(), window.timestamp_end())
            .await
        {
            Ok(intervals) => {
                info!(
                    device_id = %id,
                    position = position + 1,
                    total,
                    intervals = intervals.len(),
                    "fetched long-energy data"
                );
                results.intervals.insert(id.clone(), intervals);
            }
            Err(err) => {
                warn!(
                    device_id = %id,
                    position = position + 1,
                    total,
                    %err,
                    "failed to load long-energy data"
                );
                results.failures.insert(id.clone(), err.to_string());
            }
        }
    }
    results
}
