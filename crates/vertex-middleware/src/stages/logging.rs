//! Request logging middleware.

use std::time::Instant;

use vertex_core::{BoxFuture, HandlerResult, Request, ResponseWriter};

use crate::middleware::{Middleware, Next};

/// Emits one structured log event per request once the chain returns.
///
/// Successful and hijacked requests log at `info`, failures at `warn`
/// with the error and its status.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

impl Middleware for RequestLogger {
    fn name(&self) -> &'static str {
        "request_logger"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let start = Instant::now();
            let method = req.method().clone();
            let path = req.path().to_string();
            let request_id = req.request_id().unwrap_or_default().to_string();

            let result = next.run(w, req).await;
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &result {
                Ok(_) => tracing::info!(
                    method = %method,
                    path = %path,
                    request_id = %request_id,
                    elapsed_ms,
                    outcome = "ok",
                    "request handled"
                ),
                Err(e) if e.is_hijacked() => tracing::info!(
                    method = %method,
                    path = %path,
                    request_id = %request_id,
                    elapsed_ms,
                    outcome = "hijacked",
                    "request handled"
                ),
                Err(e) => tracing::warn!(
                    method = %method,
                    path = %path,
                    request_id = %request_id,
                    elapsed_ms,
                    status = e.status_code().map_or(0, |s| s.as_u16()),
                    error = %e,
                    "request failed"
                ),
            }
            result
        })
    }
}
