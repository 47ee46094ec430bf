//! Handler trait for request processing.

use std::future::Future;
use std::pin::Pin;

use crate::error::VertexError;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Boxed future type for handlers and middleware.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler (or a middleware chain) produces: a value for the
/// renderer, or an error. [`VertexError::Hijacked`] means the handler wrote
/// the response itself.
pub type HandlerResult = Result<serde_json::Value, VertexError>;

/// An endpoint's business logic.
///
/// The dispatcher obtains an instance from the route's prototype, binds
/// request parameters into it, then calls `handle`. Instances produced by a
/// shared prototype serve many requests at once and must not rely on
/// per-request fields.
///
/// # Example
///
/// ```rust
/// use vertex_core::{BoxFuture, Handler, HandlerResult, Request, ResponseWriter};
///
/// #[derive(Default)]
/// struct Greet {
///     name: String,
/// }
///
/// impl Handler for Greet {
///     fn handle<'a>(
///         &'a self,
///         _w: &'a mut ResponseWriter,
///         _req: &'a Request,
///     ) -> BoxFuture<'a, HandlerResult> {
///         Box::pin(async move { Ok(serde_json::json!(format!("hello {}", self.name))) })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles one request.
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, HandlerResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;

    struct Raw;

    impl Handler for Raw {
        fn handle<'a>(
            &'a self,
            w: &'a mut ResponseWriter,
            _req: &'a Request,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                w.set_status(StatusCode::ACCEPTED);
                w.write_str("raw");
                Err(VertexError::Hijacked)
            })
        }
    }

    #[test]
    fn test_hijacking_handler_writes_directly() {
        let req = Request::new(http::Request::new(Bytes::new()));
        let mut w = ResponseWriter::new();
        let result = tokio_test::block_on(Raw.handle(&mut w, &req));
        assert!(result.unwrap_err().is_hijacked());
        assert_eq!(w.status(), Some(StatusCode::ACCEPTED));
        assert_eq!(w.body(), b"raw");
    }
}
