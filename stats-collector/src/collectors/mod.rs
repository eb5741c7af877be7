//! # Collectors Module
//!
//! Scrape-time collection of volume stats.
//!
//! - **`StatsSource` trait**: wire dialect of one storage engine (fetch + decode)
//! - **`JivaSource`**: Jiva controllers, JSON on `/v1/stats`
//! - **`VolumeCollector`**: Prometheus collector driving fetch, decode and normalize on every
//!   scrape, falling back to zero values when any stage fails

pub mod jiva;
pub mod source;
pub mod volume_collector;

// Re-export the main types for easy access
pub use jiva::JivaSource;
pub use source::{
    stats_source,
    StatsSource,
};
pub use volume_collector::{
    Scrape,
    VolumeCollector,
};
