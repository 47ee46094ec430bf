//! Versioned APIs and the per-route dispatch pipeline.
//!
//! An [`Api`] is a named, versioned bundle of [`Route`]s with default
//! security, default middleware and a renderer. Registering it on a router
//! ([`Api::configure`]) builds one [`Dispatch`] per route and mounts it for
//! every method the route declares, under `/{name}/{version}` unless an
//! explicit root was given. Two auxiliary endpoints are mounted as well:
//! `{root}/swagger` (the Swagger document) and `{root}/console` (a redirect
//! to the documentation console).
//!
//! ```rust
//! use vertex_api::{Api, Route};
//! use vertex_core::{BoxFuture, Handler, HandlerResult, Methods, Request, ResponseWriter};
//! use vertex_extract::{Bind, Param, Schema};
//!
//! #[derive(Default)]
//! struct GetUser {
//!     id: String,
//! }
//!
//! impl Bind for GetUser {
//!     fn schema() -> Schema<Self> {
//!         Schema::new().field(Param::path("id").required(), |h: &mut Self, v: String| h.id = v)
//!     }
//! }
//!
//! impl Handler for GetUser {
//!     fn handle<'a>(
//!         &'a self,
//!         _w: &'a mut ResponseWriter,
//!         _req: &'a Request,
//!     ) -> BoxFuture<'a, HandlerResult> {
//!         Box::pin(async move { Ok(serde_json::json!({ "id": self.id })) })
//!     }
//! }
//!
//! let api = Api::builder("users", "1.0")
//!     .route(Route::fresh::<GetUser>("/user/{id}", Methods::GET))
//!     .build()
//!     .unwrap();
//! let router = api.router().unwrap();
//! assert!(router.match_route(&http::Method::GET, "/users/1.0/user/42").is_some());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod dispatch;
mod endpoint;
mod error;
mod path;
mod route;

pub use api::{Api, ApiBuilder, EndpointRouter};
pub use dispatch::Dispatch;
pub use endpoint::{Endpoint, RedirectEndpoint, SwaggerEndpoint};
pub use error::{ApiError, ApiResult};
pub use path::rewrite_placeholders;
pub use route::Route;
