use std::fmt;
use std::hash::Hash;

/// Hash function used for shard assignment.
///
/// The ahash variant carries a random state drawn when the map is built, so
/// routing is stable for the lifetime of one map but not across processes.
#[derive(Clone)]
pub(crate) enum ShardHasher {
    AHash(ahash::RandomState),
    #[cfg(feature = "fxhash")]
    FxHash,
}

impl ShardHasher {
    /// Hash a key to determine which shard it belongs to.
    #[inline]
    pub fn hash_key<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        match self {
            ShardHasher::AHash(state) => state.hash_one(key),
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => fxhash::hash64(key),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShardHasher::AHash(_) => "ahash",
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => "fxhash",
        }
    }
}

impl Default for ShardHasher {
    fn default() -> Self {
        ShardHasher::AHash(ahash::RandomState::new())
    }
}

impl fmt::Debug for ShardHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
