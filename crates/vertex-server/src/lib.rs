//! # Vertex Server
//!
//! Hosts [`vertex_api::Api`]s over HTTP/1.1 on hyper and tokio.
//!
//! - Every mounted API shares one router; registration conflicts across
//!   APIs are reported by [`Server::add_api`]
//! - Requests are buffered up to `max_body_bytes` and bounded by
//!   `request_timeout_ms`
//! - Transport security comes from the URI scheme or a trusted
//!   `x-forwarded-proto` header
//! - Unmatched paths answer 404, known paths with the wrong method 405
//! - `GET /console` serves the Swagger UI page that every API's
//!   `{root}/console` redirects to
//! - Shutdown stops accepting, lets in-flight requests finish and waits up to
//!   `shutdown_timeout_secs`
//!
//! ## Example
//!
//! ```rust,no_run
//! use vertex_config::ConfigLoader;
//! use vertex_server::Server;
//! # fn api() -> vertex_api::Api { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("VERTEX").load()?;
//!     let mut server = Server::from_config(&config);
//!     server.add_api(&api())?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod server;
pub mod shutdown;

pub use error::{ServerError, ServerResult};
pub use server::{Server, FORWARDED_PROTO_HEADER};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
