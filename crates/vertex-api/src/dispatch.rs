//! The per-route dispatch function.
//!
//! Every request to a route runs the same state machine:
//!
//! 1. reject insecure transport when the route does not allow it
//! 2. merge router path parameters into the request's values (path wins)
//! 3. validate the security scheme, skipping the chain on failure
//! 4. run the sealed chain: API middleware, route middleware, handler step
//! 5. render the outcome, unless the handler hijacked the response

use std::sync::Arc;

use http::StatusCode;
use tracing::instrument::WithSubscriber;
use tracing::Instrument;
use vertex_core::{
    BoxFuture, HandlerResult, RenderError, Renderer, Request, ResponseWriter, SecurityScheme,
    INSECURE_ACCESS_MESSAGE,
};
use vertex_extract::Prototype;
use vertex_middleware::{Middleware, Next, SealedChain};
use vertex_router::Params;

/// The terminal chain step: obtain a handler instance, bind, handle.
pub(crate) struct HandlerStep {
    route: String,
    prototype: Arc<dyn Prototype>,
}

impl HandlerStep {
    pub(crate) fn new(route: impl Into<String>, prototype: Arc<dyn Prototype>) -> Self {
        Self {
            route: route.into(),
            prototype,
        }
    }
}

impl Middleware for HandlerStep {
    fn name(&self) -> &'static str {
        "handler"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut Request,
        _next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let req: &Request = req;
            let handler = match self.prototype.instantiate(req) {
                Ok(handler) => handler,
                Err(e) => {
                    tracing::error!(route = %self.route, error = %e, "error reading input");
                    return Err(e.into());
                }
            };
            handler.handle(w, req).await
        })
    }
}

/// Dispatch function of one route, shared by every method it is
/// registered for.
pub struct Dispatch {
    api: String,
    route: String,
    allow_insecure: bool,
    security: Option<Arc<dyn SecurityScheme>>,
    chain: SealedChain,
    renderer: Arc<dyn Renderer>,
    observer: Option<tracing::Dispatch>,
}

impl Dispatch {
    pub(crate) fn new(
        api: impl Into<String>,
        route: impl Into<String>,
        allow_insecure: bool,
        security: Option<Arc<dyn SecurityScheme>>,
        chain: SealedChain,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            api: api.into(),
            route: route.into(),
            allow_insecure,
            security,
            chain,
            renderer,
            observer: None,
        }
    }

    pub(crate) fn with_observer(mut self, observer: Option<tracing::Dispatch>) -> Self {
        self.observer = observer;
        self
    }

    /// Declared path of the route.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Whether plain HTTP reaches the chain.
    pub fn allows_insecure(&self) -> bool {
        self.allow_insecure
    }

    /// Names of the chain steps in execution order.
    pub fn steps(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    /// Runs the request through the route and produces the response.
    ///
    /// Diagnostics go to the API's observer when one was configured.
    pub async fn serve(&self, mut req: Request, params: Params) -> http::Response<bytes::Bytes> {
        let run = async move {
            let span = tracing::info_span!(
                "dispatch",
                api = %self.api,
                route = %self.route,
                method = %req.method(),
                path = %req.path(),
            );
            let mut w = ResponseWriter::new();
            self.dispatch(&mut w, &mut req, params).instrument(span).await;
            w.into_response()
        };
        match &self.observer {
            Some(observer) => run.with_subscriber(observer.clone()).await,
            None => run.await,
        }
    }

    /// Runs the request through the route, writing into `w`.
    pub async fn dispatch(&self, w: &mut ResponseWriter, req: &mut Request, params: Params) {
        if !self.allow_insecure && !req.is_secure() {
            w.set_status(StatusCode::FORBIDDEN);
            w.set_content_type("text/plain; charset=utf-8");
            w.write_str(INSECURE_ACCESS_MESSAGE);
            return;
        }

        req.merge_path_params(params);

        let mut result: HandlerResult = Ok(serde_json::Value::Null);
        if let Some(security) = &self.security {
            if let Err(e) = security.validate(req) {
                tracing::warn!(error = %e, "error validating security scheme");
                result = Err(e.into_unauthorized());
            }
        }
        if result.is_ok() {
            result = self.chain.handle(w, req).await;
        }

        if matches!(&result, Err(e) if e.is_hijacked()) {
            tracing::debug!(uri = %req.uri(), "not rendering hijacked request");
            return;
        }
        match self.renderer.render(&result, w, req) {
            Ok(()) => {}
            Err(RenderError::Hijacked) => {
                tracing::debug!(uri = %req.uri(), "renderer left hijacked request alone");
            }
            Err(e) => tracing::error!(error = %e, "error rendering response"),
        }
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("api", &self.api)
            .field("route", &self.route)
            .field("allow_insecure", &self.allow_insecure)
            .field("secured", &self.security.is_some())
            .field("chain", &self.chain)
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
