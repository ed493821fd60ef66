use std::sync::atomic::{AtomicU64, Ordering};

use ahash::{AHashMap, RandomState};
use parking_lot::RwLock;

// ---------------------------------------------------------------------------
// Shard
// ---------------------------------------------------------------------------

/// Cache-line padding to prevent false sharing between shards.
#[repr(align(64))]
pub(crate) struct Shard {
    pub(crate) map: RwLock<AHashMap<i64, AtomicU64>>,
}

// ---------------------------------------------------------------------------
// ShardedStore
// ---------------------------------------------------------------------------

/// A thread-safe map from bucket index to accumulator, backed by `N`
/// independently-locked shards.
///
/// Adding to an existing bucket only takes the shard's shared lock and
/// performs an atomic add on the accumulator; creating or removing a bucket
/// takes the exclusive lock. Removal hands the final value to exactly one
/// caller because no add can be in flight while the exclusive lock is held.
pub struct ShardedStore {
    shards: Box<[Shard]>,
    /// Always `shards.len() - 1`; shards.len() is a power of two.
    shard_mask: usize,
    /// Hasher used only to compute shard indices.
    build_hasher: RandomState,
}

impl ShardedStore {
    pub fn new(num_shards: usize) -> Self {
        assert!(num_shards.is_power_of_two());
        let shards = (0..num_shards)
            .map(|_| Shard {
                map: RwLock::new(AHashMap::new()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        ShardedStore {
            shards,
            shard_mask: num_shards - 1,
            build_hasher: RandomState::new(),
        }
    }

    #[inline]
    fn shard(&self, key: i64) -> &Shard {
        let h = self.build_hasher.hash_one(key);
        // Use the high bits (better avalanche from ahash).
        &self.shards[((h >> 32) as usize) & self.shard_mask]
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    /// Adds `amount` to the bucket at `key`, creating it at zero if absent.
    pub fn accumulate(&self, key: i64, amount: u64) {
        let shard = self.shard(key);
        {
            let map = shard.map.read();
            if let Some(cell) = map.get(&key) {
                saturating_add(cell, amount);
                return;
            }
        }
        let mut map = shard.map.write();
        saturating_add(map.entry(key).or_insert_with(|| AtomicU64::new(0)), amount);
    }

    /// Removes the bucket at `key`, returning its final value.
    ///
    /// When several callers race to remove the same key, only one of them
    /// receives `Some`.
    pub fn remove(&self, key: i64) -> Option<u64> {
        self.shard(key)
            .map
            .write()
            .remove(&key)
            .map(AtomicU64::into_inner)
    }

    /// Current value of the bucket at `key`, if present.
    #[cfg(test)]
    pub fn get(&self, key: i64) -> Option<u64> {
        self.shard(key)
            .map
            .read()
            .get(&key)
            .map(|cell| cell.load(Ordering::Acquire))
    }

    /// Every key strictly below `cutoff`, in ascending order.
    ///
    /// Shards are read one at a time, so the result is not a snapshot of the
    /// whole store.
    pub fn keys_below(&self, cutoff: i64) -> Vec<i64> {
        let mut keys: Vec<i64> = Vec::new();
        for shard in self.shards.iter() {
            keys.extend(shard.map.read().keys().copied().filter(|k| *k < cutoff));
        }
        keys.sort_unstable();
        keys
    }

    /// Sum of every bucket at or above `cutoff`.
    pub fn sum_from(&self, cutoff: i64) -> u64 {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .map
                    .read()
                    .iter()
                    .filter(|(k, _)| **k >= cutoff)
                    .fold(0u64, |acc, (_, v)| acc.saturating_add(v.load(Ordering::Acquire)))
            })
            .fold(0u64, u64::saturating_add)
    }

    /// Returns the total number of buckets across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.map.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.map.read().is_empty())
    }
}

#[inline]
fn saturating_add(cell: &AtomicU64, amount: u64) {
    // The closure never returns `None`, so the update always succeeds.
    let _ = cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
        Some(v.saturating_add(amount))
    });
}
