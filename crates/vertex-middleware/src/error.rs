//! Chain execution errors.

use thiserror::Error;

/// Failures raised by the chain machinery itself rather than by a step.
///
/// These never reach clients directly; they are carried as the source of
/// an internal [`vertex_core::VertexError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A step or the handler panicked.
    #[error("panic in request chain: {message}")]
    Panicked {
        /// The panic payload, when it was a string.
        message: String,
    },
}
