//! Run configuration: TOML file -> validated [`RunConfig`].
//!
//! Everything downstream treats the config as already validated, so all
//! checks happen here: timezone and date parsing, date ordering, threshold
//! range, and the request-rate floor.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::devices::DeviceSelection;

/// Default requests-per-second ceiling for the API client.
const DEFAULT_REQUESTS_PER_SEC: u32 = 10;

/// Configuration failures. All of these are fatal: a run never starts with
/// a config it could not fully validate.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path passed to [`RunConfig::load`].
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `timezone` is not an IANA timezone name.
    #[error("unknown timezone {name:?}")]
    Timezone {
        /// The rejected name.
        name: String,
    },

    /// A date field is not `YYYY-MM-DD`.
    #[error("invalid date {value:?} for {field}: {source}")]
    Date {
        /// Which field was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Underlying parse error.
        source: chrono::ParseError,
    },

    /// `date_start` is after `date_end`.
    #[error("date_start {start} is after date_end {end}")]
    DateOrder {
        /// Configured start date.
        start: NaiveDate,
        /// Configured end date.
        end: NaiveDate,
    },

    /// `threshold_percent` is outside `0..=100`.
    #[error("threshold_percent must be within 0..=100, got {0}")]
    Threshold(u8),

    /// `requests_per_sec_max` is zero.
    #[error("requests_per_sec_max must be at least 1")]
    RequestRate,
}

#[derive(Debug, Deserialize)]
struct RawRunConfig {
    environment: Option<String>,
    timezone: String,
    date_start: String,
    date_end: String,
    threshold_percent: u8,
    requests_per_sec_max: Option<u32>,
    devices: Option<RawDeviceSelection>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDeviceSelection {
    id: Option<String>,
    list_file: Option<PathBuf>,
}

/// A fully validated run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Upstream environment name (`production` or `staging`).
    pub environment: String,
    /// Timezone day buckets are defined in.
    pub timezone: Tz,
    /// First civil date of the window, inclusive.
    pub date_start: NaiveDate,
    /// Last civil date of the window, inclusive.
    pub date_end: NaiveDate,
    /// Completeness threshold for the below-threshold bucket.
    pub threshold_percent: u8,
    /// Request-rate ceiling handed to the API client.
    pub requests_per_sec_max: NonZeroU32,
    /// How the working device set is chosen.
    pub devices: DeviceSelection,
}

impl RunConfig {
    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates config text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawRunConfig = toml::from_str(raw)?;

        let timezone: Tz = raw.timezone.parse().map_err(|_| ConfigError::Timezone {
            name: raw.timezone.clone(),
        })?;
        let date_start = parse_date("date_start", &raw.date_start)?;
        let date_end = parse_date("date_end", &raw.date_end)?;
        if date_start > date_end {
            return Err(ConfigError::DateOrder { start: date_start, end: date_end });
        }
        if raw.threshold_percent > 100 {
            return Err(ConfigError::Threshold(raw.threshold_percent));
        }
        let requests_per_sec_max =
            NonZeroU32::new(raw.requests_per_sec_max.unwrap_or(DEFAULT_REQUESTS_PER_SEC))
                .ok_or(ConfigError::RequestRate)?;

        // A single id takes precedence over a list file; neither set means
        // the full roster.
        let devices = match raw.devices.unwrap_or_default() {
            RawDeviceSelection { id: Some(id), .. } => DeviceSelection::Single(id),
            RawDeviceSelection { list_file: Some(path), .. } => DeviceSelection::ListFile(path),
            RawDeviceSelection { id: None, list_file: None } => DeviceSelection::Roster,
        };

        Ok(RunConfig {
            environment: raw.environment.unwrap_or_else(|| "production".to_string()),
            timezone,
            date_start,
            date_end,
            threshold_percent: raw.threshold_percent,
            requests_per_sec_max,
            devices,
        })
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    value.parse().map_err(|source| ConfigError::Date {
        field,
        value: value.to_string(),
        source,
    })
}
