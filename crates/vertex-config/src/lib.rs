//! Configuration for Vertex servers.
//!
//! [`VertexConfig`] is assembled by [`ConfigLoader`] from layers applied in
//! order:
//!
//! 1. Built-in defaults (or a development/production preset)
//! 2. Configuration files (TOML or JSON)
//! 3. Configuration strings
//! 4. Environment variables (`PREFIX__SECTION__KEY`)
//!
//! Every section is optional; unknown sections and keys are errors.
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:9947"
//! request_timeout_ms = 30000
//!
//! [logging]
//! level = "info,vertex_api=debug"
//! format = "json"
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::VertexConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, ServerConfig};
