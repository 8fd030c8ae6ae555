//! Error types for the tenant cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::cache::ValueKind;

// == Cache Error Enum ==
/// Unified error type for cache and registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Caller supplied an unusable argument (empty or missing tenant id)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored value has a different shape than the operation requires
    #[error("Type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the tenant cache.
pub type Result<T> = std::result::Result<T, CacheError>;
