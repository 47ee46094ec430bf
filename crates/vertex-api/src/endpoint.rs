//! Values registered on the router.

use bytes::Bytes;
use http::header::LOCATION;
use http::{HeaderValue, StatusCode};
use vertex_core::{BoxFuture, Request, ResponseWriter};
use vertex_docs::{ApiDescription, SWAGGER_CONTENT_TYPE};
use vertex_router::Params;

use crate::dispatch::Dispatch;

/// Something the server can hand a matched request to.
pub trait Endpoint: Send + Sync {
    /// Short label for registration logs.
    fn kind(&self) -> &'static str;

    /// Serves `req` with the parameters the router extracted.
    fn call(&self, req: Request, params: Params) -> BoxFuture<'_, http::Response<Bytes>>;
}

impl Endpoint for Dispatch {
    fn kind(&self) -> &'static str {
        "dispatch"
    }

    fn call(&self, req: Request, params: Params) -> BoxFuture<'_, http::Response<Bytes>> {
        Box::pin(self.serve(req, params))
    }
}

/// Serves an API's Swagger document.
#[derive(Debug)]
pub struct SwaggerEndpoint {
    description: ApiDescription,
}

impl SwaggerEndpoint {
    /// Serves `description`.
    pub fn new(description: ApiDescription) -> Self {
        Self { description }
    }

    fn respond(&self, req: &Request) -> http::Response<Bytes> {
        let mut w = ResponseWriter::new();
        match self.description.to_json(req.host()) {
            Ok(json) => {
                w.set_status(StatusCode::OK);
                w.set_content_type(SWAGGER_CONTENT_TYPE);
                w.write_str(&json);
            }
            Err(e) => {
                tracing::error!(error = %e, "error building swagger document");
                w.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                w.set_content_type("text/plain; charset=utf-8");
                w.write_str("swagger document unavailable");
            }
        }
        w.into_response()
    }
}

impl Endpoint for SwaggerEndpoint {
    fn kind(&self) -> &'static str {
        "swagger"
    }

    fn call(&self, req: Request, _params: Params) -> BoxFuture<'_, http::Response<Bytes>> {
        let response = self.respond(&req);
        Box::pin(async move { response })
    }
}

/// Answers every request with a fixed redirect.
#[derive(Debug, Clone)]
pub struct RedirectEndpoint {
    location: HeaderValue,
    status: StatusCode,
}

impl RedirectEndpoint {
    /// A `301 Moved Permanently` to `location`.
    pub fn permanent(location: HeaderValue) -> Self {
        Self {
            location,
            status: StatusCode::MOVED_PERMANENTLY,
        }
    }

    /// The redirect target.
    pub fn location(&self) -> &HeaderValue {
        &self.location
    }
}

impl Endpoint for RedirectEndpoint {
    fn kind(&self) -> &'static str {
        "redirect"
    }

    fn call(&self, _req: Request, _params: Params) -> BoxFuture<'_, http::Response<Bytes>> {
        let mut w = ResponseWriter::new();
        w.set_status(self.status);
        w.insert_header(LOCATION, self.location.clone());
        Box::pin(async move { w.into_response() })
    }
}
