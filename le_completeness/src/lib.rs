//! Data-completeness analysis for long-energy (LE) interval records.
//!
//! A single run selects a working set of metering devices, fetches their LE
//! intervals over a civil-date window, reconciles what arrived against the
//! expected delivery grid, and reports completeness at fleet, device, and
//! device-day granularity.

#![deny(missing_docs)]

pub mod config;
pub mod devices;
pub mod export;
pub mod fetch;
pub mod grid;
pub mod normalize;
pub mod report;
pub mod run;
pub mod window;
