//! Cache Store Module
//!
//! Bounded store combining HashMap storage with insertion-order tracking.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::cache::{CacheEntry, CacheStats, FifoTracker};

// == Memo Store ==
/// Bounded key/value storage that evicts the earliest inserted entry on overflow.
///
/// Lookups never refresh an entry's position: the eviction order is the
/// insertion order, whatever the access pattern.
#[derive(Debug)]
pub struct MemoStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Insertion order tracker
    fifo: FifoTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed, None = unbounded
    capacity: Option<NonZeroUsize>,
}

impl<K, V> MemoStore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new MemoStore.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, or None for unbounded growth
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            entries: HashMap::new(),
            fifo: FifoTracker::new(),
            stats: CacheStats::new(),
            capacity,
        }
    }

    // == Unbounded ==
    /// Creates a store that never evicts.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    // == Lookup ==
    /// Looks up a key, recording a hit or a miss.
    ///
    /// A hit does not change the eviction order.
    pub fn lookup(&mut self, key: &K) -> Option<&V> {
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(&entry.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Insert ==
    /// Stores a value at the newest end of the insertion order.
    ///
    /// If the store then holds more than `capacity` entries, exactly one
    /// entry, the earliest inserted, is removed and its key returned.
    /// Re-inserting a present key replaces the value in place and keeps
    /// its original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            return None;
        }

        self.fifo.push(key.clone());
        self.entries.insert(key, CacheEntry::new(value));

        let evicted = match self.capacity {
            Some(capacity) if self.entries.len() > capacity.get() => {
                let oldest = self.fifo.evict_oldest();
                if let Some(oldest) = &oldest {
                    self.entries.remove(oldest);
                    self.stats.record_eviction();
                }
                oldest
            }
            _ => None,
        };

        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Remove ==
    /// Removes an entry by key, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.fifo.remove(key);
        self.stats.set_total_entries(self.entries.len());
        Some(entry.value)
    }

    // == Peek ==
    /// Reads a value without touching statistics.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Contains ==
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    // == Keys ==
    /// Iterates keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.fifo.iter()
    }

    // == Iter ==
    /// Iterates entries from oldest to newest insertion.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &CacheEntry<V>)> {
        self.fifo
            .iter()
            .filter_map(|key| self.entries.get(key).map(|entry| (key, entry)))
    }

    // == Snapshot ==
    /// Copies out every entry as `(key, value)`, oldest insertion first.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Oldest ==
    /// Returns the next eviction candidate.
    pub fn oldest(&self) -> Option<&K> {
        self.fifo.peek_oldest()
    }

    // == Clear ==
    /// Drops every entry. Counters for hits, misses and evictions are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.fifo.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Capacity ==
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
