use crate::config::{create_hasher, Config};
use crate::error::Error;
use crate::hash::ShardHasher;
use crate::shard::Shard;
use crate::sizing;
use crate::stats::{ShardOps, Stats};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Concurrent map split across independently locked shards.
///
/// A key is routed to exactly one shard by `hash & (shard_count - 1)`, and
/// every single-key operation runs entirely under that shard's lock.
/// Operations on different shards never block each other. Whole-map
/// operations (`len`, `clear`, `range`) walk the shards in order and hold at
/// most one shard lock at a time, so they are not snapshots.
///
/// Values are stored as `Arc<V>`; reads hand out a clone of the `Arc`.
///
/// # Example
///
/// ```rust
/// use sharded_map::ShardedMap;
///
/// let map = ShardedMap::new(0);
/// assert!(map.set("a", 1).is_none());
/// assert_eq!(*map.set("a", 2).unwrap(), 1);
/// assert_eq!(*map.get("a").unwrap(), 2);
/// assert_eq!(*map.delete("a").unwrap(), 2);
/// assert!(map.get("a").is_none());
/// assert_eq!(map.len(), 0);
/// ```
pub struct ShardedMap<K, V> {
    shards: Box<[Shard<K, V>]>,
    shard_mask: usize,
    capacity_hint: usize,
    hash: ShardHasher,
}

impl<K, V> ShardedMap<K, V>
where
    K: Hash + Eq,
{
    /// Create a map with the hardware-derived shard count, presizing each
    /// shard to `capacity_hint / shard_count`. A hint of zero means no
    /// presizing.
    ///
    /// Allocation failure here is fatal, as it is for `Vec` or `HashMap`.
    /// Use [`ShardedMap::with_config`] to observe it as an [`Error`].
    pub fn new(capacity_hint: usize) -> Self {
        let shard_count = sizing::default_shard_count();
        let per_shard = sizing::capacity_per_shard(capacity_hint, shard_count);
        let shards = (0..shard_count)
            .map(|_| Shard::with_capacity(per_shard))
            .collect();
        Self::from_shards(shards, capacity_hint, ShardHasher::default())
    }

    /// Create a map with custom config.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        if config.shard_count == 0 || !config.shard_count.is_power_of_two() {
            return Err(Error::InvalidShardCount);
        }

        let per_shard = sizing::capacity_per_shard(config.capacity_hint, config.shard_count);
        let shards = (0..config.shard_count)
            .map(|_| Shard::try_with_capacity(per_shard))
            .collect::<Result<Box<[_]>, _>>()?;

        Ok(Self::from_shards(
            shards,
            config.capacity_hint,
            create_hasher(config.hash_function),
        ))
    }

    fn from_shards(shards: Box<[Shard<K, V>]>, capacity_hint: usize, hash: ShardHasher) -> Self {
        let shard_count = shards.len();
        tracing::debug!(
            shard_count,
            capacity_hint,
            capacity_per_shard = sizing::capacity_per_shard(capacity_hint, shard_count),
            hash = hash.name(),
            "sharded map created"
        );
        Self {
            shards,
            shard_mask: shard_count - 1,
            capacity_hint,
            hash,
        }
    }

    /// Figure out which shard this key belongs to.
    #[inline]
    fn shard_index<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        (self.hash.hash_key(key) as usize) & self.shard_mask
    }

    #[inline]
    fn shard<Q>(&self, key: &Q) -> &Shard<K, V>
    where
        Q: Hash + ?Sized,
    {
        &self.shards[self.shard_index(key)]
    }

    /// Number of shards. Fixed for the lifetime of the map.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// The total capacity hint the map was built with.
    pub fn capacity_hint(&self) -> usize {
        self.capacity_hint
    }

    /// Index of the shard `key` routes to.
    pub fn shard_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_index(key)
    }

    /// Set a value, returning the value it replaced if the key existed.
    pub fn set(&self, key: K, value: V) -> Option<Arc<V>> {
        self.shard(&key).set(key, value)
    }

    /// Set a value, letting `accept` inspect the replaced value (if any) and
    /// veto the change.
    ///
    /// `accept` runs while the shard's write lock is held, after the new value
    /// has been installed. If it returns `false` the change is undone before
    /// the lock is released (the key is removed again, or its old value is
    /// put back) and `None` is returned whatever was there before. `accept`
    /// must not call back into this map.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sharded_map::ShardedMap;
    ///
    /// let map = ShardedMap::new(0);
    /// map.set("version", 1);
    ///
    /// // compare-and-swap: only replace version 1
    /// let prev = map.set_accept("version", 2, |prev| prev == Some(&1));
    /// assert_eq!(*prev.unwrap(), 1);
    ///
    /// let prev = map.set_accept("version", 3, |prev| prev == Some(&1));
    /// assert!(prev.is_none());
    /// assert_eq!(*map.get("version").unwrap(), 2);
    /// ```
    pub fn set_accept<F>(&self, key: K, value: V, accept: F) -> Option<Arc<V>>
    where
        F: FnOnce(Option<&V>) -> bool,
    {
        self.shard(&key).set_accept(key, value, accept)
    }

    /// Get a value by key.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).get(key)
    }

    /// Check if a key exists without cloning the value.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).contains_key(key)
    }

    /// Delete a key, returning the removed value if it existed.
    pub fn delete<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).delete(key)
    }

    /// Delete a key, letting `accept` inspect the removed value (if any) and
    /// veto the removal.
    ///
    /// Same locking rules as [`ShardedMap::set_accept`]. A rejected removal
    /// restores the entry and returns `None`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sharded_map::ShardedMap;
    ///
    /// let map = ShardedMap::new(0);
    /// map.set("lease", "worker-1");
    ///
    /// assert!(map.delete_accept("lease", |owner| owner == Some(&"worker-2")).is_none());
    /// assert!(map.contains_key("lease"));
    ///
    /// assert!(map.delete_accept("lease", |owner| owner == Some(&"worker-1")).is_some());
    /// assert!(!map.contains_key("lease"));
    /// ```
    pub fn delete_accept<Q, F>(&self, key: &Q, accept: F) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(Option<&V>) -> bool,
    {
        self.shard(key).delete_accept(key, accept)
    }

    /// Total number of entries: the sum of per-shard counts, each read under
    /// its own lock. Not exact while other threads are writing.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.is_empty())
    }

    /// Remove every entry, one shard at a time.
    ///
    /// Each shard is replaced with an empty table presized from the capacity
    /// hint. Shards already cleared may be refilled by concurrent writers
    /// before the walk finishes.
    pub fn clear(&self) {
        let per_shard = sizing::capacity_per_shard(self.capacity_hint, self.shards.len());
        for shard in self.shards.iter() {
            shard.clear(per_shard);
        }
        tracing::debug!(shard_count = self.shards.len(), "sharded map cleared");
    }

    /// Call `visit` for every entry until it returns `false`.
    ///
    /// Shards are visited in order under their read locks, one at a time;
    /// entries within a shard come in no particular order. `visit` must not
    /// call back into this map.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sharded_map::ShardedMap;
    ///
    /// let map = ShardedMap::new(0);
    /// for i in 0..10 {
    ///     map.set(i, i * i);
    /// }
    ///
    /// let mut sum = 0;
    /// map.range(|_, v| {
    ///     sum += v;
    ///     true
    /// });
    /// assert_eq!(sum, 285);
    /// ```
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for shard in self.shards.iter() {
            if !shard.for_each(&mut visit) {
                return;
            }
        }
    }

    /// Entry count of each shard, in shard order.
    pub fn shard_loads(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.len()).collect()
    }

    /// Get detailed statistics about the map and its shards.
    pub fn stats(&self) -> Stats {
        let shard_sizes = self.shard_loads();
        let operations: Vec<ShardOps> = self.shards.iter().map(|s| s.stats()).collect();
        let size = shard_sizes.iter().sum();

        Stats {
            size,
            shard_sizes,
            operations,
        }
    }
}

impl<K, V> Default for ShardedMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new(0)
    }
}

impl<K, V> fmt::Debug for ShardedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedMap")
            .field("shard_count", &self.shards.len())
            .field("capacity_hint", &self.capacity_hint)
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}
