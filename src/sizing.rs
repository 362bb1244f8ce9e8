//! Shard count and presizing policy.

use std::thread;

/// Shards allocated per unit of hardware parallelism.
pub const SHARDS_PER_CPU: usize = 16;

/// Default shard count: the next power of two at or above
/// `available_parallelism() * SHARDS_PER_CPU`.
pub fn default_shard_count() -> usize {
    let cpus = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to detect available parallelism, assuming 1 cpu");
            1
        });
    shard_count_for(cpus)
}

/// Shard count for a given number of cpus. Never zero.
pub fn shard_count_for(cpus: usize) -> usize {
    cpus.max(1)
        .saturating_mul(SHARDS_PER_CPU)
        .checked_next_power_of_two()
        .unwrap_or(1 << (usize::BITS - 1))
}

/// Per-shard presize for a total capacity hint.
#[inline]
pub fn capacity_per_shard(capacity_hint: usize, shard_count: usize) -> usize {
    capacity_hint / shard_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_count_is_power_of_two() {
        for cpus in [0, 1, 2, 3, 6, 12, 64, 100] {
            let n = shard_count_for(cpus);
            assert!(n.is_power_of_two());
            assert!(n >= cpus.max(1) * SHARDS_PER_CPU);
        }
        assert_eq!(shard_count_for(1), 16);
        assert_eq!(shard_count_for(3), 64);
        assert_eq!(shard_count_for(8), 128);
    }

    #[test]
    fn default_is_valid() {
        let n = default_shard_count();
        assert!(n >= SHARDS_PER_CPU);
        assert!(n.is_power_of_two());
    }

    #[test]
    fn capacity_split() {
        assert_eq!(capacity_per_shard(0, 16), 0);
        assert_eq!(capacity_per_shard(1000, 16), 62);
        assert_eq!(capacity_per_shard(10, 16), 0);
    }
}
