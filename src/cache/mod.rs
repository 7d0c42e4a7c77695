//! Cache Module
//!
//! Provides bounded in-memory storage with insertion-order (FIFO) eviction.

mod entry;
mod fifo;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use fifo::FifoTracker;
pub use stats::CacheStats;
pub use store::MemoStore;
