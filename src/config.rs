use crate::error::Error;
use crate::hash::ShardHasher;
use crate::sizing;

/// Which hash function to use for shard assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
    /// Use ahash with a per-map random seed (default).
    #[default]
    AHash,
    /// Use fxhash (faster, deterministic, weaker distribution).
    #[cfg(feature = "fxhash")]
    FxHash,
}

/// Configuration for a ShardedMap instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) shard_count: usize,
    pub(crate) hash_function: HashFunction,
    pub(crate) capacity_hint: usize,
}

impl Config {
    /// Create a new config with defaults (hardware-derived shard count, ahash,
    /// no capacity hint).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Must be a power of two and greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        if count == 0 || !count.is_power_of_two() {
            return Err(Error::InvalidShardCount);
        }
        self.shard_count = count;
        Ok(self)
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.hash_function = hash_fn;
        self
    }

    /// Set the total capacity hint. Each shard is presized to
    /// `capacity_hint / shard_count`. Zero means no hint.
    pub fn capacity_hint(mut self, capacity: usize) -> Self {
        self.capacity_hint = capacity;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: sizing::default_shard_count(),
            hash_function: HashFunction::AHash,
            capacity_hint: 0,
        }
    }
}

/// Builder for creating a ShardedMap with custom configuration.
#[derive(Debug, Default)]
pub struct ShardedMapBuilder {
    config: Config,
}

impl ShardedMapBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Must be a power of two and greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.shard_count(count)?;
        Ok(self)
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.config = self.config.hash_function(hash_fn);
        self
    }

    /// Set the total capacity hint.
    pub fn capacity_hint(mut self, capacity: usize) -> Self {
        self.config = self.config.capacity_hint(capacity);
        self
    }

    /// Build a ShardedMap with the configured settings.
    pub fn build<K, V>(self) -> Result<crate::ShardedMap<K, V>, Error>
    where
        K: std::hash::Hash + Eq,
    {
        crate::ShardedMap::with_config(self.config)
    }
}

pub(crate) fn create_hasher(hash_fn: HashFunction) -> ShardHasher {
    match hash_fn {
        HashFunction::AHash => ShardHasher::default(),
        #[cfg(feature = "fxhash")]
        HashFunction::FxHash => ShardHasher::FxHash,
    }
}
