//! Error types for the documentation crate.

use thiserror::Error;

/// Errors that can occur while exporting documentation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("failed to serialize swagger document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Two routes declare the same method on the same path.
    #[error("duplicate operation {method} {path}")]
    DuplicateOperation {
        /// The declared route path.
        path: String,
        /// The repeated method.
        method: String,
    },

    /// A route declares a method the document model has no slot for.
    #[error("method {method} cannot be documented")]
    UnsupportedMethod {
        /// The offending method.
        method: String,
    },

    /// Failed to build the console query string.
    #[error("failed to encode console url: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
