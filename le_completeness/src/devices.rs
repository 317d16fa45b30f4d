//! Device-id validation and working-set selection.

use std::io;
use std::path::{Path, PathBuf};

use metering_api_client::source::LongEnergySource;
use tracing::{error, info};

/// Hex characters following the lead character.
const HEX_LEN: usize = 12;

/// How the run's working set of devices is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelection {
    /// A single explicit device id.
    Single(String),
    /// A text file with one candidate id per line.
    ListFile(PathBuf),
    /// The full roster associated with the API credential.
    Roster,
}

/// Outcome of working-set selection.
#[derive(Debug, Default)]
pub struct SelectedDevices {
    /// Validated ids, input order preserved.
    pub ids: Vec<String>,
    /// Error from the roster fetch, when that path was taken and failed.
    pub roster_error: Option<String>,
}

/// Returns true for ids shaped `{B..F}{12 hex}`.
///
/// The lead character must be an uppercase `B`..=`F`; the 12-character hex
/// tail is case-insensitive. Exact length, no trimming.
pub fn is_valid_device_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 1 + HEX_LEN
        && matches!(bytes[0], b'B'..=b'F')
        && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

/// Builds the working set for a run.
///
/// Candidates come from the selection mode; each one passes through
/// [`is_valid_device_id`] and invalid entries are dropped silently, order
/// preserved. A roster fetch failure is absorbed: the outcome carries zero
/// devices and the error text. An unreadable list file is an error (the
/// run cannot sensibly continue without its configured input).
pub async fn select_devices(
    selection: &DeviceSelection,
    source: &dyn LongEnergySource,
) -> io::Result<SelectedDevices> {
    let candidates = match selection {
        DeviceSelection::Single(id) => vec![id.clone()],
        DeviceSelection::ListFile(path) => read_device_list(path)?,
        DeviceSelection::Roster => match source.get_devices_list().await {
            Ok(ids) => ids,
            Err(err) => {
                error!(%err, "failed to fetch device roster");
                return Ok(SelectedDevices {
                    ids: Vec::new(),
                    roster_error: Some(err.to_string()),
                });
            }
        },
    };

    let ids: Vec<String> = candidates
        .into_iter()
        .filter(|id| is_valid_device_id(id))
        .collect();
    info!(count = ids.len(), "selected devices");
    Ok(SelectedDevices { ids, roster_error: None })
}

fn read_device_list(path: &Path) -> io::Result<Vec<String>> {
    Ok(std::fs::read_to_string(path)?
        .lines()
        .map(str::to_owned)
        .collect())
}
