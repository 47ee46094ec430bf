//! Server errors.

use std::net::SocketAddr;

use thiserror::Error;
use vertex_api::ApiError;
use vertex_config::ConfigError;

/// Errors raised while assembling or running a [`Server`](crate::Server).
#[derive(Debug, Error)]
pub enum ServerError {
    /// An API could not be mounted.
    #[error("failed to mount api: {0}")]
    Api(#[from] ApiError),

    /// The server configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The listener could not be bound.
    #[error("failed to bind to {addr}")]
    Bind {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error while serving.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Create a bind error.
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
