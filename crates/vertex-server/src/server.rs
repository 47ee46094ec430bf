//! The HTTP host.
//!
//! A [`Server`] owns one router shared by every mounted [`Api`]. Requests are
//! buffered (bounded by `max_body_bytes`), tagged secure or insecure, matched,
//! and handed to the registered endpoint. Unmatched requests get a 404, or a
//! 405 listing the allowed methods when the path exists under another method.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::uri::Scheme;
use http::{HeaderValue, Method, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use vertex_api::{Api, EndpointRouter};
use vertex_config::{ServerConfig, VertexConfig};
use vertex_core::{Request, VertexError};
use vertex_docs::{SwaggerConsole, CONSOLE_PATH};

use crate::error::{ServerError, ServerResult};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Header a TLS-terminating proxy uses to report the client's scheme.
pub const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

/// Hosts any number of APIs on one listener.
///
/// ```rust
/// use vertex_config::ServerConfig;
/// use vertex_server::Server;
///
/// let server = Server::new(ServerConfig::default());
/// assert!(server.apis().is_empty());
/// ```
pub struct Server {
    config: ServerConfig,
    router: EndpointRouter,
    console: SwaggerConsole,
    apis: Vec<String>,
}

impl Server {
    /// A server with no APIs mounted.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: EndpointRouter::new(),
            console: SwaggerConsole::new(),
            apis: Vec::new(),
        }
    }

    /// A server using the `server` section of a full configuration.
    pub fn from_config(config: &VertexConfig) -> Self {
        Self::new(config.server.clone())
    }

    /// Replace the console page served at `/console`.
    pub fn with_console(mut self, console: SwaggerConsole) -> Self {
        self.console = console;
        self
    }

    /// Mount an API: its routes, its Swagger document and its console redirect.
    pub fn add_api(&mut self, api: &Api) -> ServerResult<()> {
        api.configure(&mut self.router)?;
        info!(api = api.name(), root = api.root(), "api mounted");
        self.apis.push(api.name().to_string());
        Ok(())
    }

    /// Builder-style [`add_api`](Self::add_api).
    pub fn api(mut self, api: &Api) -> ServerResult<Self> {
        self.add_api(api)?;
        Ok(self)
    }

    /// Names of mounted APIs, in mount order.
    pub fn apis(&self) -> &[String] {
        &self.apis
    }

    /// Server settings.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The shared router.
    pub fn router(&self) -> &EndpointRouter {
        &self.router
    }

    /// Whether a request arrived over an encrypted transport.
    ///
    /// An `https` URI scheme always counts. An `x-forwarded-proto` whose first
    /// entry is `https` counts only when `trust_forwarded_proto` is set.
    pub fn is_secure<B>(&self, req: &http::Request<B>) -> bool {
        if req.uri().scheme() == Some(&Scheme::HTTPS) {
            return true;
        }
        if !self.config.trust_forwarded_proto {
            return false;
        }
        req.headers()
            .get(FORWARDED_PROTO_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
    }

    /// Serve one buffered request in-process.
    pub async fn handle(&self, req: http::Request<Bytes>) -> Response<Bytes> {
        let secure = self.is_secure(&req);
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        if let Some(matched) = self.router.match_route(&method, &path) {
            let endpoint = Arc::clone(matched.value);
            let request = Request::new(req).with_secure(secure);
            return endpoint.call(request, matched.params).await;
        }

        if method == Method::GET && path == CONSOLE_PATH {
            return self.console_page();
        }

        let allowed = self.router.allowed_methods(&path);
        if allowed.is_empty() {
            debug!(method = %method, path = %path, "no route");
            not_found(&path)
        } else {
            debug!(method = %method, path = %path, "method not allowed");
            method_not_allowed(&method, &allowed)
        }
    }

    fn console_page(&self) -> Response<Bytes> {
        let mut response = Response::new(self.console.html_bytes());
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response
    }

    /// Bind the configured address and serve until SIGINT or SIGTERM.
    pub async fn run(self) -> ServerResult<()> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Bind the configured address and serve until `shutdown` triggers.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::bind(addr, e))?;
        self.serve(listener, shutdown).await
    }

    /// Serve connections from an already-bound listener until `shutdown`
    /// triggers, then wait up to the shutdown timeout for open connections.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, apis = ?self.apis, "server listening");

        let grace = self.config.shutdown_timeout();
        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let guard = tracker.acquire();
                        let server = Arc::clone(&server);
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server.serve_connection(stream, shutdown).await {
                                debug!(remote = %remote, error = %e, "connection error");
                            }
                            drop(guard);
                        });
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => break,
            }
        }

        info!(
            active = tracker.active_connections(),
            grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
            "shutting down"
        );
        if tokio::time::timeout(grace, tracker.wait_idle()).await.is_err() {
            warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }
        info!("server stopped");
        Ok(())
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let server = Arc::clone(&self);
        let service = service_fn(move |req: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_incoming(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_incoming(&self, req: http::Request<Incoming>) -> Response<Full<Bytes>> {
        let timeout = self.config.request_timeout();
        let (parts, body) = req.into_parts();

        let limited = Limited::new(body, self.config.max_body_bytes);
        let body = match tokio::time::timeout(timeout, limited.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(
                    path = parts.uri.path(),
                    limit = self.config.max_body_bytes,
                    "request body too large"
                );
                return plain(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Ok(Err(e)) => {
                warn!(path = parts.uri.path(), error = %e, "failed to read request body");
                return plain(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
            Err(_) => {
                warn!(path = parts.uri.path(), "timed out reading request body");
                return plain(StatusCode::REQUEST_TIMEOUT, "Request body timed out");
            }
        };

        let path = parts.uri.path().to_string();
        let req = http::Request::from_parts(parts, body);
        match tokio::time::timeout(timeout, self.handle(req)).await {
            Ok(response) => response.map(Full::new),
            Err(_) => {
                warn!(path = %path, "request timed out");
                plain(StatusCode::GATEWAY_TIMEOUT, "Request timed out")
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("apis", &self.apis)
            .field("routes", &self.router.len())
            .finish_non_exhaustive()
    }
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<Bytes> {
    let mut response = Response::new(Bytes::from(body.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn not_found(path: &str) -> Response<Bytes> {
    let body = VertexError::not_found(format!("no route for {path}"))
        .to_envelope(None)
        .and_then(|envelope| serde_json::to_value(envelope).ok())
        .unwrap_or_else(|| serde_json::json!({ "error": "Not Found" }));
    json_response(StatusCode::NOT_FOUND, &body)
}

fn method_not_allowed(method: &Method, allowed: &[Method]) -> Response<Bytes> {
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let body = serde_json::json!({
        "error": {
            "code": "METHOD_NOT_ALLOWED",
            "message": format!("method {method} not allowed"),
        }
    });
    let mut response = json_response(StatusCode::METHOD_NOT_ALLOWED, &body);
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

fn plain(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use vertex_api::Route;
    use vertex_core::{BoxFuture, Handler, HandlerResult, Methods, ResponseWriter};
    use vertex_extract::{Bind, Schema};

    struct Ping;

    impl Bind for Ping {
        fn schema() -> Schema<Self> {
            Schema::new()
        }
    }

    impl Handler for Ping {
        fn handle<'a>(
            &'a self,
            _w: &'a mut ResponseWriter,
            req: &'a Request,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move { Ok(json!({ "pong": true, "secure": req.is_secure() })) })
        }
    }

    fn server(config: ServerConfig) -> Server {
        let api = Api::builder("ping", "1.0")
            .allow_insecure(true)
            .route(Route::shared("/ping", Methods::GET | Methods::PUT, Ping))
            .build()
            .unwrap();
        Server::new(config).api(&api).unwrap()
    }

    fn get(path: &str) -> http::Request<Bytes> {
        http::Request::get(path).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn test_matched_route() {
        let server = server(ServerConfig::default());
        let response = server.handle(get("/ping/1.0/ping")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({ "pong": true, "secure": false }));
        assert_eq!(server.apis(), ["ping"]);
    }

    #[tokio::test]
    async fn test_not_found() {
        let server = server(ServerConfig::default());
        let response = server.handle(get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let server = server(ServerConfig::default());
        let req = http::Request::delete("/ping/1.0/ping")
            .body(Bytes::new())
            .unwrap();
        let response = server.handle(req).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let allow = response.headers()[ALLOW].to_str().unwrap();
        assert!(allow.contains("GET"));
        assert!(allow.contains("PUT"));
    }

    #[tokio::test]
    async fn test_console_page() {
        let server = server(ServerConfig::default());
        let response = server.handle(get("/console")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }

    fn trusting_config() -> ServerConfig {
        ServerConfig {
            trust_forwarded_proto: true,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_forwarded_proto() {
        let trusting = Server::new(trusting_config());
        let req = http::Request::get("/")
            .header(FORWARDED_PROTO_HEADER, "HTTPS, http")
            .body(())
            .unwrap();
        assert!(trusting.is_secure(&req));

        let absolute = http::Request::get("https://example.com/").body(()).unwrap();
        assert!(trusting.is_secure(&absolute));
    }

    #[test]
    fn test_default_config_ignores_forwarded_proto() {
        let server = Server::new(ServerConfig::default());
        let req = http::Request::get("/")
            .header(FORWARDED_PROTO_HEADER, "https")
            .body(())
            .unwrap();
        assert!(!server.is_secure(&req));

        let absolute = http::Request::get("https://example.com/").body(()).unwrap();
        assert!(server.is_secure(&absolute));
    }

    #[tokio::test]
    async fn test_forwarded_proto_reaches_handler() {
        let req = || {
            http::Request::get("/ping/1.0/ping")
                .header(FORWARDED_PROTO_HEADER, "https")
                .body(Bytes::new())
                .unwrap()
        };

        let response = server(trusting_config()).handle(req()).await;
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["secure"], true);

        let response = server(ServerConfig::default()).handle(req()).await;
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["secure"], false);
    }

    #[test]
    fn test_duplicate_api_rejected() {
        let mut server = server(ServerConfig::default());
        let again = Api::builder("ping", "1.0")
            .route(Route::shared("/ping", Methods::GET, Ping))
            .build()
            .unwrap();
        assert!(matches!(server.add_api(&again), Err(ServerError::Api(_))));
    }

    #[tokio::test]
    async fn test_run_with_bad_address() {
        let server = Server::new(ServerConfig {
            http_addr: "not-an-address".to_string(),
            ..ServerConfig::default()
        });
        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        assert!(matches!(result, Err(ServerError::Config(_))));
    }
}
