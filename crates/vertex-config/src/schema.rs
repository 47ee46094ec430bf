//! Configuration sections.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Listen address.
    pub http_addr: String,

    /// Grace period for in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,

    /// Upper bound on one request, reading through response.
    pub request_timeout_ms: u64,

    /// Largest request body accepted.
    pub max_body_bytes: usize,

    /// Treat `x-forwarded-proto: https` as a secure transport. Enable only
    /// behind a proxy that terminates TLS and overwrites the header.
    pub trust_forwarded_proto: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:9947".to_string(),
            shutdown_timeout_secs: 30,
            request_timeout_ms: 30_000,
            max_body_bytes: 1024 * 1024,
            trust_forwarded_proto: false,
        }
    }
}

impl ServerConfig {
    /// The parsed listen address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.http_addr),
            )
        })
    }

    /// Shutdown grace period.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    Compact,
}

impl From<LogFormat> for vertex_telemetry::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Level filter in `EnvFilter` syntax.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Emit span open/close events.
    pub span_events: bool,

    /// Include file and line.
    pub file_line_info: bool,

    /// Include the event target.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

impl From<&LoggingConfig> for vertex_telemetry::LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            format: config.format.into(),
            span_events: config.span_events,
            file_line_info: config.file_line_info,
            include_target: config.include_target,
            ..Self::default()
        }
    }
}
