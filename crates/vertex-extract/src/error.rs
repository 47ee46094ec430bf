//! Binding error types.

use thiserror::Error;
use vertex_core::VertexError;

use crate::info::ParamSource;

/// Reason a request could not be bound to a handler.
///
/// Binding stops at the first failing field, so an error always names a
/// single parameter (except for an unreadable body).
///
/// # Example
///
/// ```rust
/// use vertex_extract::{BindError, ParamSource};
///
/// let err = BindError::missing("id", ParamSource::Path);
/// assert_eq!(err.field(), Some("id"));
/// assert!(err.to_string().contains("path"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A required parameter was absent or empty.
    #[error("missing required {location} parameter '{field}'")]
    Missing {
        /// Parameter name
        field: String,
        /// Where it was expected
        location: ParamSource,
    },

    /// A value could not be converted to the field's type.
    #[error("invalid {location} parameter '{field}': {reason}")]
    Invalid {
        /// Parameter name
        field: String,
        /// Where it was read from
        location: ParamSource,
        /// Conversion failure
        reason: String,
    },

    /// A converted value broke a declared constraint.
    #[error("{location} parameter '{field}' {reason}")]
    Constraint {
        /// Parameter name
        field: String,
        /// Where it was read from
        location: ParamSource,
        /// The violated constraint
        reason: String,
    },

    /// The body could not be decoded.
    #[error("malformed request body: {reason}")]
    Body {
        /// Decoder message
        reason: String,
    },

    /// The schema itself is unusable (e.g. a pattern that does not compile).
    #[error("invalid schema for '{field}': {reason}")]
    Schema {
        /// Parameter name
        field: String,
        /// What is wrong
        reason: String,
    },
}

impl BindError {
    /// Creates a missing-parameter error.
    #[must_use]
    pub fn missing(field: impl Into<String>, location: ParamSource) -> Self {
        Self::Missing {
            field: field.into(),
            location,
        }
    }

    /// The parameter this error is about.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Missing { field, .. }
            | Self::Invalid { field, .. }
            | Self::Constraint { field, .. }
            | Self::Schema { field, .. } => Some(field),
            Self::Body { .. } => None,
        }
    }

    /// Where the parameter was read from.
    #[must_use]
    pub fn location(&self) -> Option<ParamSource> {
        match self {
            Self::Missing { location, .. }
            | Self::Invalid { location, .. }
            | Self::Constraint { location, .. } => Some(*location),
            Self::Body { .. } => Some(ParamSource::Body),
            Self::Schema { .. } => None,
        }
    }
}

impl From<BindError> for VertexError {
    fn from(err: BindError) -> Self {
        let message = err.to_string();
        match (&err, err.field(), err.location()) {
            (BindError::Schema { .. }, _, _) => Self::internal(message),
            (_, Some(field), Some(location)) => {
                Self::validation_field(message, field, location.as_str())
            }
            _ => Self::validation(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vertex_core::ErrorCategory;

    #[test]
    fn test_missing_into_vertex_error() {
        let err: VertexError = BindError::missing("id", ParamSource::Path).into();
        assert_eq!(err.category(), Some(ErrorCategory::Validation));

        let envelope = err.to_envelope(None).unwrap();
        let details = envelope.error.details.unwrap();
        assert_eq!(details["field"], "id");
        assert_eq!(details["in"], "path");
    }

    #[test]
    fn test_body_error_has_no_field() {
        let err = BindError::Body {
            reason: "expected value".to_string(),
        };
        assert_eq!(err.field(), None);
        let err: VertexError = err.into();
        assert_eq!(err.category(), Some(ErrorCategory::Validation));
    }

    #[test]
    fn test_schema_error_is_internal() {
        let err = BindError::Schema {
            field: "name".to_string(),
            reason: "unclosed group".to_string(),
        };
        let err: VertexError = err.into();
        assert_eq!(err.category(), Some(ErrorCategory::Internal));
    }

    #[test]
    fn test_display() {
        let err = BindError::Constraint {
            field: "name".to_string(),
            location: ParamSource::Query,
            reason: "exceeds maximum length 3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "query parameter 'name' exceeds maximum length 3"
        );
    }
}
