#![allow(dead_code)]

use std::num::NonZeroU32;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use indexmap::IndexMap;
use le_completeness::config::RunConfig;
use le_completeness::devices::DeviceSelection;
use le_completeness::grid::INTERVAL_DURATION_SECS;
use metering_api_client::errors::{ApiClientError, StatusCode};
use metering_api_client::models::interval::LongEnergyInterval;
use metering_api_client::source::LongEnergySource;

/// In-memory stand-in for the upstream API. Roster and per-device
/// outcomes are canned; `load_long_energy` trims to the requested range
/// the way the real service does.
pub struct FakeApi {
    pub roster: Result<Vec<String>, String>,
    pub outcomes: IndexMap<String, Result<Vec<LongEnergyInterval>, String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self { roster: Ok(vec![]), outcomes: IndexMap::new() }
    }

    pub fn with_roster(mut self, ids: &[&str]) -> Self {
        self.roster = Ok(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn with_roster_failure(mut self, message: &str) -> Self {
        self.roster = Err(message.to_string());
        self
    }

    pub fn with_device(mut self, id: &str, intervals: Vec<LongEnergyInterval>) -> Self {
        self.outcomes.insert(id.to_string(), Ok(intervals));
        self
    }

    pub fn with_failure(mut self, id: &str, message: &str) -> Self {
        self.outcomes.insert(id.to_string(), Err(message.to_string()));
        self
    }
}

fn upstream_error(message: &str, url: String) -> ApiClientError {
    ApiClientError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        url,
        message: message.to_string(),
    }
}

#[async_trait]
impl LongEnergySource for FakeApi {
    async fn get_devices_list(&self) -> Result<Vec<String>, ApiClientError> {
        match &self.roster {
            Ok(ids) => Ok(ids.clone()),
            Err(message) => Err(upstream_error(message, "fake:devices".into())),
        }
    }

    async fn load_long_energy(
        &self,
        device_id: &str,
        timestamp_start: i64,
        timestamp_end: i64,
    ) -> Result<Vec<LongEnergyInterval>, ApiClientError> {
        match self.outcomes.get(device_id) {
            Some(Ok(intervals)) => Ok(intervals
                .iter()
                .filter(|i| i.timestamp >= timestamp_start && i.timestamp <= timestamp_end)
                .cloned()
                .collect()),
            Some(Err(message)) => {
                Err(upstream_error(message, format!("fake:long-energy/{device_id}")))
            }
            None => Ok(vec![]),
        }
    }
}

/// `count` consecutive 5-minute intervals, the first one ending at
/// `first_end`.
pub fn run_of_intervals(first_end: i64, count: i64) -> Vec<LongEnergyInterval> {
    (0..count)
        .map(|i| LongEnergyInterval {
            timestamp: first_end + i * INTERVAL_DURATION_SECS,
            duration: INTERVAL_DURATION_SECS,
            extras: IndexMap::new(),
        })
        .collect()
}

/// A run config over an inclusive civil-date range, roster selection by
/// default.
pub fn config_for(
    date_start: NaiveDate,
    date_end: NaiveDate,
    timezone: Tz,
    threshold_percent: u8,
    devices: DeviceSelection,
) -> RunConfig {
    RunConfig {
        environment: "production".to_string(),
        timezone,
        date_start,
        date_end,
        threshold_percent,
        requests_per_sec_max: NonZeroU32::new(10).expect("nonzero"),
        devices,
    }
}
