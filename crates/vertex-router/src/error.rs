//! Route registration errors.

use http::Method;
use thiserror::Error;

/// Result type for route registration.
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors raised while building the routing tree.
///
/// Matching never fails with an error; an unmatched path is simply `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The same method was registered twice for one path.
    #[error("duplicate route: {method} {path}")]
    Duplicate {
        /// HTTP method
        method: Method,
        /// Path pattern
        path: String,
    },

    /// A catch-all segment was followed by further segments.
    #[error("catch-all must be the last segment in '{path}'")]
    WildcardNotLast {
        /// Path pattern
        path: String,
    },

    /// A placeholder with no name (`:` or `*` alone).
    #[error("unnamed placeholder in '{path}'")]
    UnnamedPlaceholder {
        /// Path pattern
        path: String,
    },

    /// Two routes use different names for the same placeholder position.
    #[error("'{path}' names parameter '{new}' where '{existing}' is already registered")]
    ConflictingParam {
        /// Path pattern being registered
        path: String,
        /// Name already present in the tree
        existing: String,
        /// Name in the new pattern
        new: String,
    },
}
