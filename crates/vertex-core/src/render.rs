//! Renderers turn a handler result into the wire response.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::error::VertexError;
use crate::handler::HandlerResult;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Rendering failures. These are logged by the dispatcher and never change
/// a response that was already produced.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The result value could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A hijacked result reached the renderer.
    #[error("hijacked requests are not rendered")]
    Hijacked,
}

/// Writes a `(result, error)` pair into the response sink.
pub trait Renderer: Send + Sync {
    /// Renders `result` for `req` into `w`.
    fn render(
        &self,
        result: &HandlerResult,
        w: &mut ResponseWriter,
        req: &Request,
    ) -> Result<(), RenderError>;

    /// Content types this renderer can produce.
    fn content_types(&self) -> Vec<String>;
}

fn error_status(err: &VertexError) -> Result<StatusCode, RenderError> {
    err.status_code().ok_or(RenderError::Hijacked)
}

/// Renders results as JSON and errors as an error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(
        &self,
        result: &HandlerResult,
        w: &mut ResponseWriter,
        req: &Request,
    ) -> Result<(), RenderError> {
        let body = match result {
            Ok(value) => {
                let body = serde_json::to_vec(value)?;
                if w.status().is_none() {
                    w.set_status(StatusCode::OK);
                }
                body
            }
            Err(err) => {
                let status = error_status(err)?;
                let envelope = err.to_envelope(req.request_id());
                let body = serde_json::to_vec(&envelope)?;
                w.set_status(status);
                body
            }
        };
        w.set_content_type("application/json");
        w.write(&body);
        Ok(())
    }

    fn content_types(&self) -> Vec<String> {
        vec!["application/json".to_string(), "text/json".to_string()]
    }
}

/// Renders results and errors as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(
        &self,
        result: &HandlerResult,
        w: &mut ResponseWriter,
        _req: &Request,
    ) -> Result<(), RenderError> {
        let text = match result {
            Ok(Value::String(s)) => s.clone(),
            Ok(Value::Null) => String::new(),
            Ok(other) => other.to_string(),
            Err(err) => {
                w.set_status(error_status(err)?);
                err.to_string()
            }
        };
        if w.status().is_none() {
            w.set_status(StatusCode::OK);
        }
        w.set_content_type("text/plain; charset=utf-8");
        w.write_str(&text);
        Ok(())
    }

    fn content_types(&self) -> Vec<String> {
        vec!["text/plain".to_string()]
    }
}
