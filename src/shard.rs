use crate::error::Error;
use crate::stats::{ShardOps, ShardStats};
use hashbrown::hash_map::{DefaultHashBuilder, Entry, OccupiedEntry};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

/// A single shard: one reader/writer lock around one HashMap.
///
/// Every method takes the lock exactly once and releases it before returning,
/// so callers never observe a half-applied change.
pub(crate) struct Shard<K, V> {
    map: RwLock<HashMap<K, Arc<V>>>,
    stats: ShardStats,
}

impl<K, V> Shard<K, V>
where
    K: Hash + Eq,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: RwLock::new(HashMap::with_capacity(capacity)),
            stats: ShardStats::new(),
        }
    }

    /// Like `with_capacity`, but reports allocation failure instead of aborting.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        let mut map = HashMap::new();
        map.try_reserve(capacity)
            .map_err(|err| Error::from_reserve(err, capacity))?;
        Ok(Self {
            map: RwLock::new(map),
            stats: ShardStats::new(),
        })
    }

    /// Insert a key-value pair, returning the previous value if any.
    pub fn set(&self, key: K, value: V) -> Option<Arc<V>> {
        let prev = self.map.write().insert(key, Arc::new(value));
        self.stats.record_write();
        prev
    }

    /// Tentatively install `value`, then let `accept` decide whether it stays.
    ///
    /// The write lock is held from the tentative write through the rollback,
    /// so no other operation on this shard can observe the rejected value.
    /// The rollback also runs if `accept` panics.
    pub fn set_accept<F>(&self, key: K, value: V, accept: F) -> Option<Arc<V>>
    where
        F: FnOnce(Option<&V>) -> bool,
    {
        let mut map = self.map.write();
        let pending = match map.entry(key) {
            Entry::Occupied(mut entry) => {
                let prev = entry.insert(Arc::new(value));
                PendingSet {
                    entry: Some(entry),
                    prev: Some(prev),
                }
            }
            vacant => PendingSet {
                entry: Some(vacant.insert(Arc::new(value))),
                prev: None,
            },
        };
        if accept(pending.prev.as_deref()) {
            self.stats.record_write();
            return pending.commit();
        }
        drop(pending);
        self.stats.record_rejection();
        tracing::trace!("set rejected by accept predicate, rolled back");
        None
    }

    /// Get a value by key, returning an Arc to enable zero-copy access.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let result = self.map.read().get(key).cloned();
        if result.is_some() {
            self.stats.record_read();
        }
        result
    }

    /// Remove a key, returning the value if it existed.
    pub fn delete<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let result = self.map.write().remove(key);
        if result.is_some() {
            self.stats.record_remove();
        }
        result
    }

    /// Remove a key, then let `accept` decide whether the removal stands.
    /// A rejected removal puts the original key and value back, including
    /// when `accept` panics.
    pub fn delete_accept<Q, F>(&self, key: &Q, accept: F) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(Option<&V>) -> bool,
    {
        let mut map = self.map.write();
        let removed = map.remove_entry(key);
        let pending = PendingDelete {
            map: &mut *map,
            removed,
        };
        if accept(pending.removed.as_ref().map(|(_, prev)| &**prev)) {
            let prev = pending.commit();
            if prev.is_some() {
                self.stats.record_remove();
            }
            return prev;
        }
        let restored = pending.removed.is_some();
        drop(pending);
        if restored {
            self.stats.record_rejection();
            tracing::trace!("delete rejected by accept predicate, rolled back");
        }
        None
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Swap in a fresh table presized to `capacity`. The table is allocated
    /// before the lock is taken and the old entries are dropped after it is
    /// released.
    pub fn clear(&self, capacity: usize) {
        let fresh = HashMap::with_capacity(capacity);
        let old = std::mem::replace(&mut *self.map.write(), fresh);
        drop(old);
    }

    /// Visit every entry under the read lock. Returns false as soon as
    /// `visit` does.
    pub fn for_each<F>(&self, visit: &mut F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        let map = self.map.read();
        map.iter().all(|(key, value)| visit(key, value.as_ref()))
    }

    pub fn stats(&self) -> ShardOps {
        self.stats.snapshot()
    }
}

/// A tentative `set_accept` write. Dropping it without `commit` restores the
/// previous value, or removes the key if there was none.
struct PendingSet<'a, K, V> {
    entry: Option<OccupiedEntry<'a, K, Arc<V>, DefaultHashBuilder>>,
    prev: Option<Arc<V>>,
}

impl<K, V> PendingSet<'_, K, V> {
    fn commit(mut self) -> Option<Arc<V>> {
        self.entry = None;
        self.prev.take()
    }
}

impl<K, V> Drop for PendingSet<'_, K, V> {
    fn drop(&mut self) {
        if let Some(mut entry) = self.entry.take() {
            match self.prev.take() {
                Some(prev) => {
                    entry.insert(prev);
                }
                None => {
                    entry.remove();
                }
            }
        }
    }
}

/// A tentative `delete_accept` removal. Dropping it without `commit` puts
/// the removed entry back.
struct PendingDelete<'a, K: Hash + Eq, V> {
    map: &'a mut HashMap<K, Arc<V>>,
    removed: Option<(K, Arc<V>)>,
}

impl<K: Hash + Eq, V> PendingDelete<'_, K, V> {
    fn commit(mut self) -> Option<Arc<V>> {
        self.removed.take().map(|(_, prev)| prev)
    }
}

impl<K: Hash + Eq, V> Drop for PendingDelete<'_, K, V> {
    fn drop(&mut self) {
        if let Some((key, prev)) = self.removed.take() {
            self.map.insert(key, prev);
        }
    }
}
