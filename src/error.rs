//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror.
//!
//! Failures of a wrapped computation are not represented here: they use the
//! computation's own error type and reach the caller unchanged.

use thiserror::Error;

// == Memo Error Enum ==
/// Errors raised by the cache itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoError {
    /// An argument cannot be turned into a stable, comparable key
    #[error("Uncacheable argument: {0}")]
    UncacheableKey(String),

    /// A configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, MemoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MemoError::UncacheableKey("args[0] is an array".to_string());
        assert_eq!(err.to_string(), "Uncacheable argument: args[0] is an array");

        let err = MemoError::InvalidConfig("MEMO_CACHE_SIZE=abc".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: MEMO_CACHE_SIZE=abc");
    }

    #[test]
    fn test_error_converts_into_anyhow() {
        let err: anyhow::Error = MemoError::UncacheableKey("x".to_string()).into();
        assert!(err.downcast_ref::<MemoError>().is_some());
    }
}
