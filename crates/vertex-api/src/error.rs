//! Registration errors.

use thiserror::Error;
use vertex_docs::DocsError;
use vertex_extract::BindError;
use vertex_router::RouterError;

/// Errors raised while building an API or registering it on a router.
///
/// Everything here is detected before the first request is served.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API has no name.
    #[error("api name must not be empty")]
    MissingName,

    /// The API has no version.
    #[error("api {name}: version must not be empty")]
    MissingVersion {
        /// API name.
        name: String,
    },

    /// A route declares no methods.
    #[error("route {path} declares no methods")]
    NoMethods {
        /// Declared route path.
        path: String,
    },

    /// A route's parameter schema cannot be enforced.
    #[error("invalid parameter schema for {path}: {source}")]
    Schema {
        /// Declared route path.
        path: String,
        /// The schema problem.
        source: BindError,
    },

    /// The router rejected a registration.
    #[error("cannot register {path}: {source}")]
    Route {
        /// Mount path.
        path: String,
        /// The router's complaint.
        source: RouterError,
    },

    /// The documentation could not be built.
    #[error(transparent)]
    Docs(#[from] DocsError),

    /// The console redirect target is not a valid header value.
    #[error("invalid redirect location {location}")]
    Redirect {
        /// The rejected location.
        location: String,
    },
}

/// Result type for registration.
pub type ApiResult<T> = Result<T, ApiError>;
