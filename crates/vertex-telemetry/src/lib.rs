//! Structured logging for Vertex services.
//!
//! Vertex logs through `tracing`. This crate turns a [`LogConfig`] into a
//! subscriber, either installed process-wide with [`init_logging`] or
//! returned as a [`tracing::Dispatch`] by [`build_dispatch`] so it can be
//! handed to a single API without touching global state:
//!
//! ```rust,ignore
//! let observer = vertex_telemetry::build_dispatch(&LogConfig::development())?;
//! let api = Api::builder("users", "1.0").observer(observer).build()?;
//! ```
//!
//! # Levels
//!
//! | Event | Level |
//! |-------|-------|
//! | route registration | info |
//! | security rejection | warn |
//! | binder or renderer failure | error |
//! | hijacked response, mount path computation | debug |

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{build_dispatch, create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
