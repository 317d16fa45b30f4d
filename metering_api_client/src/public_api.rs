//! High-level client for the vendor's public API.

use std::num::NonZeroU32;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{error, info};

use crate::errors::{ApiClientError, ClientInitError};
use crate::models::granularity::{Granularity, batch_spans};
use crate::models::interval::LongEnergyInterval;
use crate::rest::RestClient;
use crate::source::LongEnergySource;

/// Production API host.
pub const PRODUCTION_BASE_URL: &str = "https://api-v3.wattwatchers.com.au";
/// Staging API host.
pub const STAGING_BASE_URL: &str = "https://api-v3-stage.wattwatchers.com.au";

/// Environment variable the API key is read from.
pub const API_KEY_VAR: &str = "PUBLIC_API_KEY";

/// Energy unit requested for LE loads.
const ENERGY_UNIT: &str = "kWh";

/// Client for the public API: device roster and windowed LE loads.
///
/// Requests are throttled client-wide to the configured ceiling and windows
/// longer than the per-request maximum are split into batches transparently.
pub struct PublicApiClient {
    rest: RestClient,
}

impl PublicApiClient {
    /// Builds a client against the host for `environment`:
    /// `"production"`/`"prod"` or `"staging"`; anything else falls back to
    /// the production host.
    pub fn new(
        environment: &str,
        api_key: &SecretString,
        requests_per_sec_max: NonZeroU32,
    ) -> Result<Self, ClientInitError> {
        let rest = RestClient::new(base_url_for(environment), api_key, requests_per_sec_max)?;
        Ok(Self { rest })
    }

    /// Like [`PublicApiClient::new`], with the API key taken from the
    /// `PUBLIC_API_KEY` environment variable.
    pub fn from_env(
        environment: &str,
        requests_per_sec_max: NonZeroU32,
    ) -> Result<Self, ClientInitError> {
        let api_key = SecretString::from(shared_utils::env::get_env_var(API_KEY_VAR)?);
        Self::new(environment, &api_key, requests_per_sec_max)
    }

    /// LE records for `[timestamp_start, timestamp_end]` at an explicit
    /// granularity.
    ///
    /// The window is split into per-request batches and the results are
    /// concatenated in order. The first failing batch fails the whole load;
    /// no partial data is returned.
    pub async fn load_long_energy_at(
        &self,
        device_id: &str,
        timestamp_start: i64,
        timestamp_end: i64,
        granularity: Granularity,
    ) -> Result<Vec<LongEnergyInterval>, ApiClientError> {
        let path = format!("long-energy/{device_id}");
        let mut energy_data = Vec::new();
        for span in batch_spans(granularity, timestamp_start, timestamp_end) {
            let query = [
                ("fromTs", span.timestamp_start.to_string()),
                ("toTs", span.timestamp_end.to_string()),
                ("convert[energy]", ENERGY_UNIT.to_string()),
                ("granularity", granularity.code().to_string()),
            ];
            info!(
                device_id,
                from = span.timestamp_start,
                to = span.timestamp_end,
                "loading LE batch"
            );
            let batch: Vec<LongEnergyInterval> =
                match self.rest.get_json(&path, &query).await {
                    Ok(batch) => batch,
                    Err(err) => {
                        error!(
                            device_id,
                            from = span.timestamp_start,
                            to = span.timestamp_end,
                            %err,
                            "error retrieving LE data"
                        );
                        return Err(err);
                    }
                };
            energy_data.extend(batch);
        }
        Ok(energy_data)
    }
}

#[async_trait]
impl LongEnergySource for PublicApiClient {
    async fn get_devices_list(&self) -> Result<Vec<String>, ApiClientError> {
        self.rest.get_json("devices", &[]).await
    }

    async fn load_long_energy(
        &self,
        device_id: &str,
        timestamp_start: i64,
        timestamp_end: i64,
    ) -> Result<Vec<LongEnergyInterval>, ApiClientError> {
        self.load_long_energy_at(device_id, timestamp_start, timestamp_end, Granularity::FiveMins)
            .await
    }
}

fn base_url_for(environment: &str) -> &'static str {
    match environment {
        "production" | "prod" => PRODUCTION_BASE_URL,
        "staging" => STAGING_BASE_URL,
        // fallback is prod
        _ => PRODUCTION_BASE_URL,
    }
}
