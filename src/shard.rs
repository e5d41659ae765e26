//! Hash-sharded histogram protected by per-shard locks.

use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use rustc_hash::FxHasher;

use crate::ngram::{add, merge_partials, Histogram};

/// Fixed array of independently lockable histogram shards.
///
/// Shard `i` owns exactly the keys whose hash modulo the shard count equals
/// `i`, for the lifetime of one counting pass. Workers hold a shard's lock
/// only while applying an already-buffered increment, never while scanning
/// tokens or hashing keys.
#[derive(Debug)]
pub struct ShardTable {
    shards: Vec<Mutex<Histogram>>,
}

impl ShardTable {
    /// Creates a table of `count` empty shards. The engine validates that
    /// `count` is positive before any worker starts.
    #[must_use]
    pub fn new(count: usize) -> Self {
        let shards = (0..count).map(|_| Mutex::new(Histogram::default())).collect();
        Self { shards }
    }

    /// Number of shards in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Whether the table holds no shards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Deterministic shard index for a key.
    #[must_use]
    pub fn shard_for_key(&self, key: &str) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Adds a buffered count for `key` under the owning shard's lock.
    ///
    /// A poisoned shard means another worker panicked mid-pass, which is a
    /// programming defect rather than a recoverable condition.
    pub fn add(&self, key: String, amount: u64) {
        let index = self.shard_for_key(&key);
        let mut shard = self.shards[index].lock().expect("shard lock poisoned");
        add(&mut shard, key, amount);
    }

    /// Consumes the table and concatenates every shard into one histogram.
    ///
    /// Callers invoke this only after all workers have joined, so no further
    /// synchronization is needed.
    #[must_use]
    pub fn into_histogram(self) -> Histogram {
        let partials = self
            .shards
            .into_iter()
            .map(|shard| shard.into_inner().expect("shard lock poisoned"))
            .collect();
        merge_partials(partials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_always_selects_same_shard() {
        let table = ShardTable::new(64);
        let first = table.shard_for_key("a b");
        assert_eq!(table.shard_for_key("a b"), first);
        assert!(first < table.len());
    }

    #[test]
    fn adds_accumulate_across_flushes() {
        let table = ShardTable::new(8);
        table.add("a b".into(), 2);
        table.add("a b".into(), 3);
        table.add("b a".into(), 1);
        let hist = table.into_histogram();
        assert_eq!(hist.get("a b"), Some(&5));
        assert_eq!(hist.get("b a"), Some(&1));
    }

    #[test]
    fn single_shard_table_still_collects_everything() {
        let table = ShardTable::new(1);
        table.add("x".into(), 1);
        table.add("y".into(), 1);
        assert_eq!(table.into_histogram().len(), 2);
    }
}
