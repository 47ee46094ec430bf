//! Top-level configuration.

use serde::{Deserialize, Serialize};

use crate::schema::{LoggingConfig, ServerConfig};
use crate::ConfigError;

/// Complete configuration for a Vertex server.
///
/// Every section defaults, so an empty file is a valid configuration.
/// Unknown sections and keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct VertexConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl VertexConfig {
    /// Configuration tuned for local development.
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                http_addr: "127.0.0.1:9947".to_string(),
                ..ServerConfig::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: crate::LogFormat::Pretty,
                file_line_info: true,
                ..LoggingConfig::default()
            },
        }
    }

    /// Configuration tuned for production.
    pub fn production() -> Self {
        Self::default()
    }

    /// Check values that deserialization alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        vertex_telemetry::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }

    /// The logging section as a telemetry config.
    pub fn log_config(&self) -> vertex_telemetry::LogConfig {
        (&self.logging).into()
    }
}
