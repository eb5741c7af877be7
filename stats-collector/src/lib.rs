//! # Volume Stats Collector
//!
//! Turns the stats endpoint of a storage volume controller into Prometheus gauges.
//!
//! ## Pipeline
//!
//! Every scrape runs, without caching anything between scrapes:
//!
//! 1. **Fetch**: `GET <controller>/v1/stats` with a bounded timeout ([`StatsClient`])
//! 2. **Decode**: tolerant JSON decoding into [`VolumeStats`]; numbers may arrive as strings,
//!    missing or malformed fields read as zero, only a body that is not a JSON object fails
//! 3. **Normalize**: [`normalize`] converts block and byte counters into GiB and truncates
//!    timings into [`MetricsSnapshot`]
//!
//! A failure in fetch or decode yields the all-zero snapshot; the error is logged and counted in
//! `<namespace>_collection_errors_total` but never fails the scrape.
//!
//! ## Exported gauges
//!
//! `<namespace>_actual_used`, `_logical_size`, `_sector_size`, `_reads`, `_read_time`,
//! `_read_block_count`, `_writes`, `_write_time`, `_write_block_count`, `_size_of_volume`.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod collectors;
pub mod error;
pub mod metrics;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use client::StatsClient;
pub use collectors::*;
pub use error::*;
pub use metrics::*;
pub use registry::MetricsRegistry;
