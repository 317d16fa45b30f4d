//! End-to-end run orchestration: selection, fetch, reconciliation, reports.

use anyhow::Context;
use metering_api_client::source::LongEnergySource;
use tracing::info;

use crate::config::RunConfig;
use crate::devices::select_devices;
use crate::fetch::fetch_intervals;
use crate::grid::{expected_grid, INTERVAL_DURATION_SECS};
use crate::normalize::{normalize_intervals, row_table, RowTable};
use crate::report::{
    daily_table, device_table, fleet_summary, DailyCompleteness, DeviceCompleteness, FleetSummary,
};
use crate::window::TimeWindow;

/// Everything one run produces.
#[derive(Debug, PartialEq)]
pub struct RunReport {
    /// Fleet-level scalars.
    pub summary: FleetSummary,
    /// Whole-period completeness per device with data, worst first.
    pub device_table: Vec<DeviceCompleteness>,
    /// Zero-filled per-device-per-day completeness.
    pub daily_table: Vec<DailyCompleteness>,
    /// Flattened interval rows.
    pub rows: RowTable,
    /// Error text from a failed roster fetch, if that was the selection
    /// mode and it failed. The tables above are degenerate in that case.
    pub roster_error: Option<String>,
}

/// Executes one completeness run against the given interval source.
///
/// Only configuration-level problems (an impossible window) abort the run;
/// retrieval failures are absorbed into the report per device.
pub async fn run(config: &RunConfig, source: &dyn LongEnergySource) -> anyhow::Result<RunReport> {
    let window = TimeWindow::from_civil_dates(
        config.date_start,
        config.date_end,
        config.timezone,
        INTERVAL_DURATION_SECS,
    )
    .context("invalid run window")?;
    let grid = expected_grid(&window, INTERVAL_DURATION_SECS)
        .context("failed to lay out the expected interval grid")?;
    info!(
        start = %window.start(),
        end = %window.end(),
        days = grid.days.len(),
        expected_total = grid.total,
        "run window resolved"
    );

    let selected = select_devices(&config.devices, source)
        .await
        .context("device selection failed")?;
    let results = fetch_intervals(source, &selected.ids, &window).await;
    let rows = normalize_intervals(&results.intervals, config.timezone, INTERVAL_DURATION_SECS);

    Ok(RunReport {
        summary: fleet_summary(&results, &grid, config.threshold_percent),
        device_table: device_table(&results, &grid),
        daily_table: daily_table(&results, &rows, &grid),
        rows: row_table(&rows),
        roster_error: selected.roster_error,
    })
}
