//! Security schemes.
//!
//! A [`SecurityScheme`] runs before any middleware or handler. Rejections
//! that come back unclassified (internal) are reported as unauthorized by
//! the dispatcher; a scheme that wants a different status returns a more
//! specific [`VertexError`].

use std::collections::HashSet;

use crate::error::VertexError;
use crate::request::Request;

/// Validates a request's credentials or transport.
pub trait SecurityScheme: Send + Sync {
    /// Accepts the request or explains why not.
    fn validate(&self, req: &Request) -> Result<(), VertexError>;
}

/// Where an [`ApiKeyScheme`] reads the key from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLocation {
    /// A request header.
    Header(String),
    /// A query (or form) parameter.
    Query(String),
}

/// Accepts requests that present one of a fixed set of API keys.
///
/// ```
/// use vertex_core::{ApiKeyScheme, Request, SecurityScheme};
///
/// let scheme = ApiKeyScheme::header("x-api-key", ["s3cret"]);
/// let req = Request::new(
///     http::Request::builder()
///         .header("x-api-key", "s3cret")
///         .body(bytes::Bytes::new())
///         .unwrap(),
/// );
/// assert!(scheme.validate(&req).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ApiKeyScheme {
    location: KeyLocation,
    keys: HashSet<String>,
}

impl ApiKeyScheme {
    /// Reads the key from header `name`.
    pub fn header<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: KeyLocation::Header(name.into()),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads the key from query parameter `name`.
    pub fn query<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: KeyLocation::Query(name.into()),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Where the key is read from.
    #[must_use]
    pub fn location(&self) -> &KeyLocation {
        &self.location
    }
}

impl SecurityScheme for ApiKeyScheme {
    fn validate(&self, req: &Request) -> Result<(), VertexError> {
        let presented = match &self.location {
            KeyLocation::Header(name) => req.header(name),
            KeyLocation::Query(name) => req.param(name),
        };
        match presented {
            None | Some("") => Err(VertexError::unauthorized("missing API key")),
            Some(key) if self.keys.contains(key) => Ok(()),
            Some(_) => Err(VertexError::unauthorized("invalid API key")),
        }
    }
}

/// Wraps a closure as a security scheme.
pub struct FnScheme<F> {
    func: F,
}

impl<F> FnScheme<F>
where
    F: Fn(&Request) -> Result<(), VertexError> + Send + Sync,
{
    /// Creates a scheme from a validation closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> SecurityScheme for FnScheme<F>
where
    F: Fn(&Request) -> Result<(), VertexError> + Send + Sync,
{
    fn validate(&self, req: &Request) -> Result<(), VertexError> {
        (self.func)(req)
    }
}

impl<F> std::fmt::Debug for FnScheme<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnScheme").finish_non_exhaustive()
    }
}

/// Rejects requests that did not arrive over an encrypted transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireSecure;

impl SecurityScheme for RequireSecure {
    fn validate(&self, req: &Request) -> Result<(), VertexError> {
        if req.is_secure() {
            Ok(())
        } else {
            Err(VertexError::forbidden("secure transport required"))
        }
    }
}
