//! # sharded-map
//!
//! A thread-safe map split across many independently locked shards.
//!
//! Every key hashes to exactly one shard, and each shard pairs a
//! reader/writer lock with its own `HashMap`. Readers of a shard run in
//! parallel, writers get it exclusively, and operations on different shards
//! never contend. There is no global lock.
//!
//! ## Accept/reject updates
//!
//! [`ShardedMap::set_accept`] and [`ShardedMap::delete_accept`] apply a
//! change tentatively, show the caller the previous value while the shard is
//! still write-locked, and roll the change back if the caller's predicate
//! returns `false`. This gives per-key compare-and-swap without ever
//! releasing the lock between the check and the commit.
//!
//! ## Example
//!
//! ```rust
//! use sharded_map::ShardedMap;
//!
//! let map = ShardedMap::new(0);
//!
//! map.set("hits", 1u64);
//!
//! // increment only if nobody else changed it in between
//! let current = *map.get("hits").unwrap();
//! let swapped = map.set_accept("hits", current + 1, |prev| prev == Some(&current));
//! assert!(swapped.is_some());
//!
//! map.range(|key, value| {
//!     println!("{key}: {value}");
//!     true
//! });
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use sharded_map::{HashFunction, ShardedMapBuilder};
//!
//! let map = ShardedMapBuilder::new()
//!     .shard_count(32)?  // Must be power of two
//!     .capacity_hint(4096)
//!     .hash_function(HashFunction::AHash)
//!     .build::<String, i32>()?;
//! assert_eq!(map.shard_count(), 32);
//! # Ok::<(), sharded_map::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
mod hash;
mod map;
mod shard;
pub mod sizing;
pub mod stats;

pub use config::{Config, HashFunction, ShardedMapBuilder};
pub use error::Error;
pub use map::ShardedMap;
pub use stats::{ShardOps, Stats};
