pub mod snapshot;
pub mod volume_stats;

// Re-export the main types for easy access
pub use snapshot::{
    normalize,
    MetricsSnapshot,
    GAUGE_DEFS,
};
pub use volume_stats::VolumeStats;
