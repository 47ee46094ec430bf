//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level filter did not parse.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected filter string.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");

        let err = TelemetryError::InvalidFilter {
            filter: "x=loud".to_string(),
            reason: "bad level".to_string(),
        };
        assert!(err.to_string().contains("x=loud"));
    }
}
