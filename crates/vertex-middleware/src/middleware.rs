//! Core middleware trait and the continuation passed to each step.
//!
//! # Example
//!
//! ```
//! use vertex_core::{BoxFuture, HandlerResult, Request, ResponseWriter};
//! use vertex_middleware::{Middleware, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         w: &'a mut ResponseWriter,
//!         req: &'a mut Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, HandlerResult> {
//!         Box::pin(async move {
//!             let start = std::time::Instant::now();
//!             let result = next.run(w, req).await;
//!             tracing::debug!(elapsed = ?start.elapsed(), "downstream finished");
//!             result
//!         })
//!     }
//! }
//! ```

use std::sync::Arc;

use vertex_core::{BoxFuture, HandlerResult, Request, ResponseWriter};

/// A type-erased middleware that can be stored in a chain.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// One link of an interceptor chain.
///
/// A step receives the response sink, the request and a [`Next`]
/// continuation for the rest of the chain.
///
/// # Contract
///
/// - Calling `next.run()` continues the chain. `run` takes `Next` by value
///   and `Next` is neither `Clone` nor `Copy`, so a step can continue the
///   chain at most once.
/// - Returning without calling it short-circuits every later step,
///   including the handler.
/// - Errors from downstream may be wrapped or replaced, but
///   [`vertex_core::VertexError::Hijacked`] must be returned unchanged.
pub trait Middleware: Send + Sync + 'static {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Processes the request, usually by calling `next`.
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult>;
}

/// The rest of the chain after the current step.
///
/// Running the continuation consumes it, so a step cannot run the rest of
/// the chain twice:
///
/// ```compile_fail
/// use vertex_middleware::FnMiddleware;
///
/// let twice = FnMiddleware::new("twice", |w, req, next| {
///     Box::pin(async move {
///         let _ = next.run(&mut *w, &mut *req).await;
///         next.run(w, req).await
///     })
/// });
/// ```
pub struct Next<'a> {
    steps: &'a [BoxedMiddleware],
}

impl<'a> Next<'a> {
    pub(crate) fn new(steps: &'a [BoxedMiddleware]) -> Self {
        Self { steps }
    }

    /// Number of steps still to run.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Runs the next step. Past the end of the chain this yields `Ok(null)`.
    pub fn run<'b>(
        self,
        w: &'b mut ResponseWriter,
        req: &'b mut Request,
    ) -> BoxFuture<'b, HandlerResult>
    where
        'a: 'b,
    {
        match self.steps.split_first() {
            Some((step, rest)) => step.handle(w, req, Next { steps: rest }),
            None => Box::pin(async { Ok(serde_json::Value::Null) }),
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.steps.len())
            .finish()
    }
}

/// A middleware built from a closure.
///
/// ```
/// use vertex_core::VertexError;
/// use vertex_middleware::FnMiddleware;
///
/// let deny = FnMiddleware::new("deny-delete", |w, req, next| {
///     Box::pin(async move {
///         if req.method() == http::Method::DELETE {
///             return Err(VertexError::forbidden("deletes are disabled"));
///         }
///         next.run(w, req).await
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut ResponseWriter, &'a mut Request, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new closure-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut ResponseWriter, &'a mut Request, Next<'a>) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        (self.func)(w, req, next)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
