//! The async seam between data consumers and the vendor API.
//!
//! [`LongEnergySource`] is the narrow view a completeness run needs:
//! the device roster plus windowed LE loads. Keeping it a trait lets
//! pipelines run against in-memory fakes in tests and supports dynamic
//! dispatch (`&dyn LongEnergySource`) at the call sites.

use async_trait::async_trait;

use crate::errors::ApiClientError;
use crate::models::interval::LongEnergyInterval;

/// Upstream operations the completeness pipeline consumes.
#[async_trait]
pub trait LongEnergySource: Send + Sync {
    /// All device ids associated with the API credential.
    async fn get_devices_list(&self) -> Result<Vec<String>, ApiClientError>;

    /// LE records for `device_id` over `[timestamp_start, timestamp_end]`,
    /// at the native 5-minute granularity.
    async fn load_long_energy(
        &self,
        device_id: &str,
        timestamp_start: i64,
        timestamp_end: i64,
    ) -> Result<Vec<LongEnergyInterval>, ApiClientError>;
}
