//! # Vertex
//!
//! Versioned HTTP APIs built from declarative routes.
//!
//! - **Declarative binding** – a handler declares its path, query and body
//!   parameters once; the same declaration validates requests and documents
//!   the API
//! - **Composable middleware** – API-wide stages run before route stages,
//!   then the handler; any stage may short-circuit
//! - **Pluggable security and rendering** – per-API defaults, per-route
//!   overrides
//! - **Swagger 2.0** – every API serves its own document and console
//!
//! ## Quick Start
//!
//! ```rust
//! use vertex::prelude::*;
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct Hello {
//!     name: String,
//! }
//!
//! impl Bind for Hello {
//!     fn schema() -> Schema<Self> {
//!         Schema::new().field(Param::path("name").required(), |h: &mut Self, v: String| h.name = v)
//!     }
//! }
//!
//! impl Handler for Hello {
//!     fn handle<'a>(&'a self, _w: &'a mut ResponseWriter, _req: &'a Request) -> BoxFuture<'a, HandlerResult> {
//!         Box::pin(async move { Ok(json!({ "hello": self.name })) })
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Api::builder("greeter", "1.0")
//!     .allow_insecure(true)
//!     .with_middleware(default_middleware())
//!     .route(Route::fresh::<Hello>("/hello/{name}", Methods::GET))
//!     .build()?;
//!
//! let server = Server::new(ServerConfig::default()).api(&api)?;
//!
//! let req = http::Request::get("/greeter/1.0/hello/ada").body(bytes::Bytes::new())?;
//! let response = server.handle(req).await;
//! assert_eq!(response.status(), 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Server ─ router ─┬─ {root}/path   → Dispatch: secure? → params → security → chain → render
//!                  ├─ {root}/swagger → Swagger JSON
//!                  └─ {root}/console → 301 /console?url=…
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use vertex_api as api;
pub use vertex_config as config;
pub use vertex_core as core;
pub use vertex_docs as docs;
pub use vertex_extract as extract;
pub use vertex_middleware as middleware;
pub use vertex_router as router;
pub use vertex_server as server;
pub use vertex_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use vertex::prelude::*;
/// ```
pub mod prelude {
    pub use vertex_api::{Api, ApiBuilder, ApiError, Route};
    pub use vertex_config::{ConfigLoader, ServerConfig, VertexConfig};
    pub use vertex_core::{
        ApiKeyScheme, BoxFuture, FnScheme, Handler, HandlerResult, JsonRenderer, Methods,
        Renderer, Request, RequireSecure, ResponseWriter, SecurityScheme, TextRenderer,
        VertexError, VertexResult,
    };
    pub use vertex_extract::{Bind, FromParam, Param, Schema};
    pub use vertex_middleware::{default_middleware, FnMiddleware, Middleware, Next};
    pub use vertex_server::{Server, ShutdownSignal};
    pub use vertex_telemetry::{init_logging, LogConfig};
}
