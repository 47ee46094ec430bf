//! Core types for the Vertex dispatch layer.
//!
//! Everything a dispatch function moves between its stages lives here: the
//! [`Request`] wrapper with its merged [`FormValues`], the
//! [`ResponseWriter`] sink, the [`VertexError`] taxonomy (including the
//! [`VertexError::Hijacked`] sentinel), and the three capabilities a route
//! is assembled from: [`Handler`], [`SecurityScheme`] and [`Renderer`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod form;
mod handler;
mod methods;
mod render;
mod request;
mod response;
mod security;

pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, VertexError, VertexResult};
pub use form::FormValues;
pub use handler::{BoxFuture, Handler, HandlerResult};
pub use methods::Methods;
pub use render::{JsonRenderer, RenderError, Renderer, TextRenderer};
pub use request::{Request, RequestId};
pub use response::ResponseWriter;
pub use security::{ApiKeyScheme, FnScheme, KeyLocation, RequireSecure, SecurityScheme};

/// Fixed body sent when insecure transport is refused.
pub const INSECURE_ACCESS_MESSAGE: &str = "Insecure access forbidden";
