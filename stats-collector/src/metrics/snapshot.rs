use crate::metrics::VolumeStats;

const GIB: u128 = 1 << 30;

/// Name suffix and help text of every gauge, in the order of [`MetricsSnapshot::values`].
pub const GAUGE_DEFS: [(&str, &str); 10] = [
    ("actual_used", "Space actually used by the volume, in GiB"),
    ("logical_size", "Logical space used by the volume, in GiB"),
    ("sector_size", "Sector size of the volume, in bytes"),
    ("reads", "Read I/O operations on the volume"),
    ("read_time", "Total time spent reading, in milliseconds"),
    ("read_block_count", "Blocks read from the volume"),
    ("writes", "Write I/O operations on the volume"),
    ("write_time", "Total time spent writing, in milliseconds"),
    ("write_block_count", "Blocks written to the volume"),
    ("size_of_volume", "Provisioned size of the volume, in GiB"),
];

/// Normalized values of one scrape. The default is the all-zero snapshot reported when a scrape
/// fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub actual_used: u64,
    pub logical_size: u64,
    pub sector_size: u64,
    pub reads: u64,
    pub read_time: u64,
    pub read_block_count: u64,
    pub writes: u64,
    pub write_time: u64,
    pub write_block_count: u64,
    pub size_of_volume: u64,
}

impl MetricsSnapshot {
    pub fn values(&self) -> [u64; 10] {
        [
            self.actual_used,
            self.logical_size,
            self.sector_size,
            self.reads,
            self.read_time,
            self.read_block_count,
            self.writes,
            self.write_time,
            self.write_block_count,
            self.size_of_volume,
        ]
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Converts raw controller stats into the exported units. Sizes become whole GiB, timings whole
/// milliseconds; everything truncates toward zero.
pub fn normalize(stats: &VolumeStats) -> MetricsSnapshot {
    MetricsSnapshot {
        actual_used: blocks_to_gib(stats.used_blocks, stats.sector_size),
        logical_size: blocks_to_gib(stats.used_logical_blocks, stats.sector_size),
        sector_size: stats.sector_size,
        reads: stats.read_iops,
        read_time: truncate_millis(stats.total_read_time),
        read_block_count: stats.total_read_block_count,
        writes: stats.write_iops,
        write_time: truncate_millis(stats.total_write_time),
        write_block_count: stats.total_write_block_count,
        size_of_volume: bytes_to_gib(u128::from(stats.size)),
    }
}

fn blocks_to_gib(blocks: u64, sector_size: u64) -> u64 {
    bytes_to_gib(u128::from(blocks) * u128::from(sector_size))
}

fn bytes_to_gib(bytes: u128) -> u64 {
    u64::try_from(bytes / GIB).unwrap_or(u64::MAX)
}

/// `as` saturates at the bounds and maps NaN to zero.
fn truncate_millis(millis: f64) -> u64 {
    if millis > 0.0 {
        millis as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn jiva_sample() -> VolumeStats {
        VolumeStats {
            name: "vol".to_string(),
            read_iops: 1,
            write_iops: 15,
            replica_counter: 6,
            revision_counter: 100,
            sector_size: 4096,
            size: 1073741824,
            total_read_block_count: 10,
            total_write_block_count: 10,
            total_read_time: 10.0,
            total_write_time: 15.0,
            up_time: 10.0,
            used_blocks: 1048576,
            used_logical_blocks: 1048576,
        }
    }

    #[test]
    fn converts_jiva_sample() {
        assert_eq!(
            normalize(&jiva_sample()),
            MetricsSnapshot {
                actual_used: 4,
                logical_size: 4,
                sector_size: 4096,
                reads: 1,
                read_time: 10,
                read_block_count: 10,
                writes: 15,
                write_time: 15,
                write_block_count: 10,
                size_of_volume: 1,
            }
        );
    }

    #[test]
    fn is_deterministic() {
        let stats = jiva_sample();
        assert_eq!(normalize(&stats), normalize(&stats));
        assert_eq!(stats, jiva_sample());
    }

    #[test]
    fn sizes_truncate_to_whole_gib() {
        let stats = VolumeStats {
            size: (1 << 31) - 1,
            sector_size: 512,
            used_blocks: (1 << 21) - 1,
            used_logical_blocks: 1 << 21,
            ..VolumeStats::default()
        };
        let snapshot = normalize(&stats);
        assert_eq!(snapshot.size_of_volume, 1);
        assert_eq!(snapshot.actual_used, 0);
        assert_eq!(snapshot.logical_size, 1);
    }

    #[test]
    fn block_products_beyond_u64_do_not_overflow() {
        let stats = VolumeStats {
            sector_size: 1 << 20,
            used_blocks: u64::MAX,
            used_logical_blocks: 1 << 40,
            ..VolumeStats::default()
        };
        let snapshot = normalize(&stats);
        // (2^64 - 1) * 2^20 / 2^30 = (2^64 - 1) / 2^10
        assert_eq!(snapshot.actual_used, u64::MAX >> 10);
        assert_eq!(snapshot.logical_size, 1 << 30);
    }

    #[test]
    fn timings_truncate_toward_zero() {
        let stats = VolumeStats {
            total_read_time: 45.99,
            total_write_time: -3.0,
            ..VolumeStats::default()
        };
        let snapshot = normalize(&stats);
        assert_eq!(snapshot.read_time, 45);
        assert_eq!(snapshot.write_time, 0);

        let stats = VolumeStats {
            total_read_time: f64::NAN,
            total_write_time: 1e30,
            ..VolumeStats::default()
        };
        let snapshot = normalize(&stats);
        assert_eq!(snapshot.read_time, 0);
        assert_eq!(snapshot.write_time, u64::MAX);
    }

    #[test]
    fn empty_stats_give_the_zero_snapshot() {
        assert!(normalize(&VolumeStats::default()).is_zero());
        assert_eq!(GAUGE_DEFS.len(), MetricsSnapshot::default().values().len());
    }
}
