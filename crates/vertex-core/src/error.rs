//! Error types for Vertex.
//!
//! [`VertexError`] is the error half of every handler, middleware and
//! security result. Each variant except [`VertexError::Hijacked`] belongs to
//! an [`ErrorCategory`], which decides the HTTP status a renderer uses and
//! the `code` written into the [`ErrorEnvelope`].
//!
//! `Hijacked` is not a failure: it tells the dispatch function that the
//! handler already wrote the complete response, so nothing may be rendered.
//! Middleware must hand it upward untouched.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`VertexError`].
pub type VertexResult<T> = Result<T, VertexError>;

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid or missing request parameters.
    Validation,
    /// Missing or rejected credentials.
    Unauthorized,
    /// Access refused regardless of credentials.
    Forbidden,
    /// Resource not found.
    NotFound,
    /// Conflicting state.
    Conflict,
    /// Anything unclassified.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable code written into error envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Standard error type for Vertex.
///
/// # Example
///
/// ```
/// use vertex_core::{ErrorCategory, VertexError};
///
/// fn lookup(id: &str) -> Result<(), VertexError> {
///     if id.is_empty() {
///         return Err(VertexError::validation_field("id is empty", "id", "path"));
///     }
///     Err(VertexError::not_found(format!("user {id}")))
/// }
///
/// let err = lookup("7").unwrap_err();
/// assert_eq!(err.category(), Some(ErrorCategory::NotFound));
/// ```
#[derive(Error, Debug)]
pub enum VertexError {
    /// Request parameters failed binding or validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// The offending parameter, if known.
        field: Option<String>,
        /// Where the parameter was read from (path, query, body).
        location: Option<String>,
    },

    /// Credentials missing or rejected.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
    },

    /// Access refused.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Conflicting state.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// Unclassified failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (never exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The response was written directly; rendering must be skipped.
    #[error("request hijacked")]
    Hijacked,
}

impl VertexError {
    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            location: None,
        }
    }

    /// Creates a validation error naming the offending field and its source.
    #[must_use]
    pub fn validation_field(
        message: impl Into<String>,
        field: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
            location: Some(location.into()),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category, `None` for [`VertexError::Hijacked`].
    #[must_use]
    pub const fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Validation { .. } => Some(ErrorCategory::Validation),
            Self::Unauthorized { .. } => Some(ErrorCategory::Unauthorized),
            Self::Forbidden { .. } => Some(ErrorCategory::Forbidden),
            Self::NotFound { .. } => Some(ErrorCategory::NotFound),
            Self::Conflict { .. } => Some(ErrorCategory::Conflict),
            Self::Internal { .. } => Some(ErrorCategory::Internal),
            Self::Hijacked => None,
        }
    }

    /// Returns the HTTP status code for this error, `None` when hijacked.
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self.category() {
            Some(category) => Some(category.default_status_code()),
            None => None,
        }
    }

    /// Returns true for the [`VertexError::Hijacked`] sentinel.
    #[must_use]
    pub const fn is_hijacked(&self) -> bool {
        matches!(self, Self::Hijacked)
    }

    /// Reclassifies a security failure.
    ///
    /// Unclassified (internal) errors become [`VertexError::Unauthorized`],
    /// keeping their message. Every other variant is already specific and is
    /// returned unchanged.
    #[must_use]
    pub fn into_unauthorized(self) -> Self {
        match self {
            Self::Internal { message, .. } => Self::Unauthorized { message },
            other => other,
        }
    }

    /// Converts this error to a serializable envelope.
    ///
    /// Returns `None` for [`VertexError::Hijacked`], which is never rendered.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> Option<ErrorEnvelope> {
        let category = self.category()?;
        Some(ErrorEnvelope {
            error: ErrorDetail {
                code: category.code().to_string(),
                message: self.public_message(),
                category,
                details: self.details(),
            },
            request_id: request_id.map(ToString::to_string),
        })
    }

    /// The message shown to clients; internal sources stay private.
    fn public_message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Internal { message, .. } => message.clone(),
            Self::Hijacked => String::new(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation {
                field: Some(field),
                location,
                ..
            } => Some(serde_json::json!({
                "field": field,
                "in": location,
            })),
            _ => None,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
