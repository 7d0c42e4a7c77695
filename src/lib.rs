//! Memo Cache - A bounded memoizing cache
//!
//! Wraps computations so repeated calls with the same arguments return the
//! stored result. Each wrapper owns a cache of fixed capacity that evicts the
//! earliest inserted entry on overflow; cache hits never change that order.

pub mod cache;
pub mod config;
pub mod error;
pub mod memo;

pub use cache::{CacheStats, MemoStore};
pub use config::MemoConfig;
pub use error::{MemoError, Result};
pub use memo::{Arg, CallKey, Lookup, Memoized, SharedMemoized};
