//! # Vertex Docs
//!
//! Documentation export for Vertex APIs.
//!
//! This crate provides:
//! - **Swagger 2.0 document model** ([`Swagger`] and friends)
//! - **[`ApiDescription`]**, the route metadata an API hands over for export,
//!   turned into a document with [`ApiDescription::to_swagger`]
//! - **[`SwaggerConsole`]**, the interactive console page, and
//!   [`console_location`] for the per-API redirect to it
//!
//! Parameters are exported from the same [`vertex_extract::RequestInfo`] the
//! binder enforces, so the required set and the source of every field in
//! the document match what a request is checked against.
//!
//! ## Quick Start
//!
//! ```rust
//! use vertex_core::Methods;
//! use vertex_docs::{ApiDescription, RouteDescription};
//! use vertex_extract::{ParamInfo, ParamKind, ParamSource, RequestInfo};
//!
//! let info = RequestInfo::new(vec![ParamInfo {
//!     name: "id".into(),
//!     source: ParamSource::Path,
//!     kind: ParamKind::String,
//!     format: None,
//!     required: true,
//!     constraints: Default::default(),
//!     doc: None,
//! }]);
//!
//! let api = ApiDescription::new("Users", "1.0", "/users/1.0")
//!     .route(RouteDescription::new("/user/{id}", Methods::GET, info));
//! let doc = api.to_swagger(Some("example.com")).unwrap();
//! assert!(doc.paths.contains_key("/user/{id}"));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod console;
mod describe;
mod error;
mod swagger;

pub use console::{console_location, SwaggerConsole, CONSOLE_PATH};
pub use describe::{ApiDescription, RouteDescription};
pub use error::{DocsError, DocsResult};
pub use swagger::{Info, Items, Operation, Parameter, ParameterIn, PathItem, Response, Swagger};

/// Content type of the exported document.
pub const SWAGGER_CONTENT_TYPE: &str = "text/json";
