//! Request ID middleware.
//!
//! Every request gets a correlation id: the incoming `X-Request-ID` when
//! trusted and well-formed, otherwise a new UUID v7 (time-ordered). The id
//! is stored in the request extensions, where renderers and loggers pick it
//! up, and echoed on the response.

use http::header::{HeaderName, HeaderValue};
use uuid::Uuid;
use vertex_core::{BoxFuture, HandlerResult, Request, RequestId, ResponseWriter};

use crate::middleware::{Middleware, Next};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or propagates request IDs.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Always generates a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses a valid incoming `X-Request-ID` header.
    ///
    /// Use this behind a trusted proxy or for service-to-service traffic.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn incoming(&self, req: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }
        req.header(REQUEST_ID_HEADER)
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(|id| RequestId(id.to_string()))
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let id = self
                .incoming(req)
                .unwrap_or_else(|| RequestId(Uuid::now_v7().to_string()));
            req.extensions_mut().insert(id.clone());

            let result = next.run(w, req).await;

            if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                w.insert_header(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            result
        })
    }
}
