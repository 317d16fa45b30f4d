//! Wire models for the public API.

pub mod granularity;
pub mod interval;
