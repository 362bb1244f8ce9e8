/// Errors that can occur when constructing a ShardedMap.
///
/// Map operations never fail: a missing key is reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The shard count is invalid (must be a power of two and greater than 0).
    #[error("shard count must be a power of two and greater than 0")]
    InvalidShardCount,
    /// Presizing a shard for `capacity` entries overflows the table size.
    #[error("capacity overflow while presizing a shard for {capacity} entries")]
    CapacityOverflow {
        /// Requested per-shard capacity.
        capacity: usize,
    },
    /// The allocator refused the memory needed to presize a shard.
    #[error("allocation failed while presizing a shard for {capacity} entries")]
    AllocationFailed {
        /// Requested per-shard capacity.
        capacity: usize,
    },
}

impl Error {
    pub(crate) fn from_reserve(err: hashbrown::TryReserveError, capacity: usize) -> Self {
        match err {
            hashbrown::TryReserveError::CapacityOverflow => Error::CapacityOverflow { capacity },
            hashbrown::TryReserveError::AllocError { .. } => Error::AllocationFailed { capacity },
        }
    }
}
