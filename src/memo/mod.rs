//! Memo Module
//!
//! Memoizing wrappers around computations, each owning a bounded FIFO cache.
//!
//! # Types
//! - `CallKey`: canonical positional + keyword argument signature
//! - `Memoized`: synchronous wrapper, one cache per instance
//! - `SharedMemoized`: async wrapper guarded by a single mutex

mod key;
mod memoized;
mod shared;

pub use key::{Arg, CallKey, CanonicalFloat};
pub use memoized::{Lookup, Memoized};
pub use shared::SharedMemoized;
