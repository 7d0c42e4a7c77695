//! Cache Entry Module
//!
//! Defines the stored value of a memoized call together with its insertion time.

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// Represents a single cached result.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The computed result
    pub value: V,
    /// When the result was inserted
    pub inserted_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Utc::now(),
        }
    }

    // == Age ==
    /// Returns how long ago the entry was inserted.
    ///
    /// Clamped to zero if the wall clock moved backwards.
    pub fn age(&self) -> chrono::Duration {
        let elapsed = Utc::now() - self.inserted_at;
        if elapsed < chrono::Duration::zero() {
            chrono::Duration::zero()
        } else {
            elapsed
        }
    }
}
