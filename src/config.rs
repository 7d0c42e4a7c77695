//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::num::NonZeroUsize;

use tracing::warn;

use crate::error::{MemoError, Result};

/// Capacity used when `MEMO_CACHE_SIZE` is unset or invalid.
pub const DEFAULT_CAPACITY: usize = 2;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "MEMO_LOG";

/// Log filter used when neither `RUST_LOG` nor `MEMO_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "memo_cache=info";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoConfig {
    /// Maximum number of cached signatures per wrapped function, None = unbounded
    pub capacity: Option<NonZeroUsize>,
}

impl MemoConfig {
    /// Creates a new MemoConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_CACHE_SIZE` - Capacity, or `none`/`unbounded` (default: 2)
    ///
    /// The log filter (`MEMO_LOG`) is read by the subscriber setup in the
    /// binary, before this runs, so that warnings emitted here are visible.
    pub fn from_env() -> Self {
        let capacity = match env::var("MEMO_CACHE_SIZE") {
            Ok(raw) => Self::parse_capacity(&raw).unwrap_or_else(|err| {
                warn!("{}, falling back to {}", err, DEFAULT_CAPACITY);
                NonZeroUsize::new(DEFAULT_CAPACITY)
            }),
            Err(_) => NonZeroUsize::new(DEFAULT_CAPACITY),
        };

        Self { capacity }
    }

    /// Parses a capacity value.
    ///
    /// `none` and `unbounded` (any case) disable eviction. Zero is rejected
    /// because a cache that can hold nothing would never return a hit.
    pub fn parse_capacity(raw: &str) -> Result<Option<NonZeroUsize>> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("unbounded") {
            return Ok(None);
        }

        let value: usize = trimmed
            .parse()
            .map_err(|_| MemoError::InvalidConfig(format!("MEMO_CACHE_SIZE={:?}", raw)))?;

        NonZeroUsize::new(value)
            .map(Some)
            .ok_or_else(|| MemoError::InvalidConfig("MEMO_CACHE_SIZE must be positive".to_string()))
    }
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_CAPACITY),
        }
    }
}
