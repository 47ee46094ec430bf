//! Panic recovery middleware.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use vertex_core::{BoxFuture, HandlerResult, Request, ResponseWriter, VertexError};

use crate::error::ChainError;
use crate::middleware::{Middleware, Next};

/// Converts a panic anywhere downstream into an internal error, so the
/// request still gets a rendered response and the worker survives.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recover;

impl Middleware for Recover {
    fn name(&self) -> &'static str {
        "recover"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let path = req.path().to_string();
            match AssertUnwindSafe(next.run(w, req)).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(
                        path = %path,
                        panic = %message,
                        "recovered panic in request chain"
                    );
                    Err(VertexError::internal_with_source(
                        "internal server error",
                        ChainError::Panicked { message },
                    ))
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
