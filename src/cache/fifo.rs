//! FIFO Tracker Module
//!
//! Tracks insertion order for oldest-first eviction.

use std::collections::VecDeque;

// == FIFO Tracker ==
/// Tracks insertion order of cache keys.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion
/// - Back = Newest insertion
///
/// Reads never reorder keys; only `push` and removals change the queue.
#[derive(Debug)]
pub struct FifoTracker<K> {
    /// Keys in insertion order
    order: VecDeque<K>,
}

impl<K> Default for FifoTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FifoTracker<K> {
    // == Constructor ==
    /// Creates a new empty FIFO tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records a newly inserted key at the newest end.
    ///
    /// The caller guarantees the key is not already tracked.
    pub fn push(&mut self, key: K) {
        self.order.push_back(key);
    }

    // == Evict Oldest ==
    /// Returns and removes the earliest inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<K> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the earliest inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.front()
    }

    // == Iter ==
    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }
}

impl<K: PartialEq> FifoTracker<K> {
    // == Remove ==
    /// Removes a key from the tracker, keeping the order of the rest.
    pub fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
