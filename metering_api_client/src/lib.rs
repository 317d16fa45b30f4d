//! Throttled client for the metering vendor's public REST API.

pub mod errors;
pub mod models;
pub mod public_api;
pub mod rest;
pub mod source;

pub use public_api::PublicApiClient;
pub use source::LongEnergySource;
