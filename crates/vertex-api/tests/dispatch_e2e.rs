//! End-to-end tests of the dispatch pipeline.
//!
//! These drive registered routes the way the server does: match on the
//! router, wrap the request, call the endpoint, inspect the response.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{Method, StatusCode};
use proptest::prelude::*;
use serde_json::{json, Value};
use vertex_api::{Api, EndpointRouter, Route};
use vertex_core::{
    ApiKeyScheme, BoxFuture, FnScheme, Handler, HandlerResult, JsonRenderer, Methods,
    RenderError, Renderer, Request, ResponseWriter, VertexError,
};
use vertex_extract::{Bind, Param, ParamSource, Schema};
use vertex_middleware::{BoxedMiddleware, FnMiddleware};
use vertex_router::Params;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct UserHandler {
    id: String,
    name: String,
}

impl Bind for UserHandler {
    fn schema() -> Schema<Self> {
        Schema::new()
            .field(
                Param::path("id").required().doc("The Id Of the user"),
                |h: &mut Self, v: String| h.id = v,
            )
            .field(
                Param::query("name").required().max_len(100).doc("The Name Of the user"),
                |h: &mut Self, v: String| h.name = v,
            )
    }
}

impl Handler for UserHandler {
    fn handle<'a>(
        &'a self,
        _w: &'a mut ResponseWriter,
        _req: &'a Request,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move { Ok(json!({ "id": self.id, "name": self.name })) })
    }
}

/// Records its invocation in a shared flag.
struct Flagged {
    called: Arc<AtomicBool>,
}

impl Bind for Flagged {
    fn schema() -> Schema<Self> {
        Schema::new()
    }
}

impl Handler for Flagged {
    fn handle<'a>(
        &'a self,
        _w: &'a mut ResponseWriter,
        _req: &'a Request,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            self.called.store(true, Ordering::SeqCst);
            Ok(json!("reached"))
        })
    }
}

/// Writes the response itself and bypasses rendering.
#[derive(Default)]
struct Streamer;

impl Bind for Streamer {
    fn schema() -> Schema<Self> {
        Schema::new()
    }
}

impl Handler for Streamer {
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        _req: &'a Request,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            w.set_status(StatusCode::ACCEPTED);
            w.set_content_type("text/csv");
            w.write_str("a,b\n1,2\n");
            Err(VertexError::Hijacked)
        })
    }
}

/// JSON renderer that counts its calls.
#[derive(Clone, Default)]
struct SpyRenderer {
    renders: Arc<AtomicUsize>,
}

impl Renderer for SpyRenderer {
    fn render(
        &self,
        result: &HandlerResult,
        w: &mut ResponseWriter,
        req: &Request,
    ) -> Result<(), RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        JsonRenderer.render(result, w, req)
    }

    fn content_types(&self) -> Vec<String> {
        JsonRenderer.content_types()
    }
}

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(label: &'static str, log: &Log) -> BoxedMiddleware {
    let log = Arc::clone(log);
    Arc::new(FnMiddleware::new(label, move |w, req, next| {
        let log = Arc::clone(&log);
        Box::pin(async move {
            log.lock().unwrap().push(label.to_string());
            next.run(w, req).await
        })
    }))
}

fn request(method: Method, uri: &str, secure: bool) -> Request {
    Request::new(
        http::Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::HOST, "api.example.com")
            .body(Bytes::new())
            .unwrap(),
    )
    .with_secure(secure)
}

/// Routes `req` through `router` like the server does.
async fn serve(router: &EndpointRouter, req: Request) -> http::Response<Bytes> {
    let path = req.path().to_string();
    let matched = router
        .match_route(req.method(), &path)
        .unwrap_or_else(|| panic!("no route for {path}"));
    matched.value.call(req, matched.params).await
}

fn body_json(response: &http::Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn user_api() -> Api {
    Api::builder("testung", "1.0")
        .title("Testung API")
        .allow_insecure(true)
        .route(Route::fresh::<UserHandler>("/user/{id}", Methods::GET).description("Fetch a user"))
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_path_param_binds_into_fresh_handler() {
    let router = user_api().router().unwrap();
    let response = serve(
        &router,
        request(Method::GET, "/testung/1.0/user/42?name=ann", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(&response), json!({ "id": "42", "name": "ann" }));
}

#[tokio::test]
async fn test_path_param_wins_over_query_value() {
    let router = user_api().router().unwrap();
    let response = serve(
        &router,
        request(Method::GET, "/testung/1.0/user/42?id=7&name=ann", false),
    )
    .await;

    assert_eq!(body_json(&response)["id"], "42");
}

#[tokio::test]
async fn test_missing_path_segment_fails_binding_on_id() {
    let api = user_api();
    let dispatch = api.dispatch(&api.routes()[0]).unwrap();

    let response = dispatch
        .serve(request(Method::GET, "/testung/1.0/user/?name=ann", false), Params::new())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(&response);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], "id");
    assert_eq!(body["error"]["details"]["in"], "path");
}

#[tokio::test]
async fn test_constraint_violation_names_field() {
    let router = user_api().router().unwrap();
    let long = "x".repeat(101);
    let response = serve(
        &router,
        request(Method::GET, &format!("/testung/1.0/user/1?name={long}"), false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&response)["error"]["details"]["field"], "name");
}

// ---------------------------------------------------------------------------
// Chain order and short-circuit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_api_middleware_then_route_middleware_then_handler() {
    let log: Log = Arc::default();
    let handler_log = Arc::clone(&log);
    let last: BoxedMiddleware = Arc::new(FnMiddleware::new("probe", move |w, req, next| {
        let log = Arc::clone(&handler_log);
        Box::pin(async move {
            let result = next.run(w, req).await;
            log.lock().unwrap().push("handler-returned".to_string());
            result
        })
    }));

    let api = Api::builder("orders", "1.0")
        .allow_insecure(true)
        .with_middleware([recorder("api-1", &log), recorder("api-2", &log)])
        .route(
            Route::fresh::<UserHandler>("/user/{id}", Methods::GET)
                .with_middleware([recorder("route-1", &log), last]),
        )
        .build()
        .unwrap();
    let router = api.router().unwrap();

    let response = serve(&router, request(Method::GET, "/orders/1.0/user/5?name=z", false)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["api-1", "api-2", "route-1", "handler-returned"]
    );
}

#[tokio::test]
async fn test_short_circuit_never_reaches_handler() {
    let called = Arc::new(AtomicBool::new(false));
    let gate: BoxedMiddleware = Arc::new(FnMiddleware::new("gate", |_w, _req, _next| {
        Box::pin(async { Err(VertexError::conflict("maintenance window")) })
    }));

    let api = Api::builder("orders", "1.0")
        .allow_insecure(true)
        .with_middleware([gate])
        .route(Route::shared(
            "/ping",
            Methods::GET,
            Flagged {
                called: Arc::clone(&called),
            },
        ))
        .build()
        .unwrap();
    let router = api.router().unwrap();

    let response = serve(&router, request(Method::GET, "/orders/1.0/ping", false)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(&response)["error"]["message"], "maintenance window");
    assert!(!called.load(Ordering::SeqCst));
}

// ---------------------------------------------------------------------------
// Transport and security
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_insecure_request_is_forbidden_before_the_chain() {
    let called = Arc::new(AtomicBool::new(false));
    let log: Log = Arc::default();
    let api = Api::builder("vault", "1.0")
        .with_middleware([recorder("api-1", &log)])
        .route(Route::shared(
            "/secret",
            Methods::GET,
            Flagged {
                called: Arc::clone(&called),
            },
        ))
        .build()
        .unwrap();
    let router = api.router().unwrap();

    let response = serve(&router, request(Method::GET, "/vault/1.0/secret", false)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.body().as_ref(), b"Insecure access forbidden");
    assert!(!called.load(Ordering::SeqCst));
    assert!(log.lock().unwrap().is_empty());

    let response = serve(&router, request(Method::GET, "/vault/1.0/secret", true)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_route_may_allow_insecure_transport() {
    let api = Api::builder("vault", "1.0")
        .route(Route::fresh::<UserHandler>("/user/{id}", Methods::GET).allow_insecure(true))
        .build()
        .unwrap();
    let router = api.router().unwrap();

    let response = serve(&router, request(Method::GET, "/vault/1.0/user/1?name=a", false)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_failure_skips_middleware_and_handler() {
    let called = Arc::new(AtomicBool::new(false));
    let log: Log = Arc::default();
    let api = Api::builder("vault", "1.0")
        .allow_insecure(true)
        .security(ApiKeyScheme::header("x-api-key", ["s3cret"]))
        .with_middleware([recorder("api-1", &log)])
        .route(Route::shared(
            "/secret",
            Methods::GET,
            Flagged {
                called: Arc::clone(&called),
            },
        ))
        .build()
        .unwrap();
    let router = api.router().unwrap();

    let response = serve(&router, request(Method::GET, "/vault/1.0/secret", false)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(log.lock().unwrap().is_empty());
    assert!(!called.load(Ordering::SeqCst));

    let mut inner = request(Method::GET, "/vault/1.0/secret", false).into_inner();
    inner
        .headers_mut()
        .insert("x-api-key", http::HeaderValue::from_static("s3cret"));
    let response = serve(&router, Request::new(inner)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*log.lock().unwrap(), vec!["api-1"]);
}

#[tokio::test]
async fn test_unclassified_security_error_becomes_unauthorized() {
    let api = Api::builder("vault", "1.0")
        .allow_insecure(true)
        .security(FnScheme::new(|_req: &Request| {
            Err(VertexError::internal("token service unreachable"))
        }))
        .route(
            Route::fresh::<UserHandler>("/user/{id}", Methods::GET).security(FnScheme::new(
                |_req: &Request| Err(VertexError::forbidden("suspended")),
            )),
        )
        .route(Route::fresh::<UserHandler>("/member/{id}", Methods::GET))
        .build()
        .unwrap();
    let router = api.router().unwrap();

    let response = serve(&router, request(Method::GET, "/vault/1.0/member/1?name=a", false)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = serve(&router, request(Method::GET, "/vault/1.0/user/1?name=a", false)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(&response)["error"]["message"], "suspended");
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_hijacked_response_is_never_rendered() {
    let spy = SpyRenderer::default();
    let api = Api::builder("export", "1.0")
        .allow_insecure(true)
        .renderer(spy.clone())
        .route(Route::fresh::<Streamer>("/report", Methods::GET))
        .route(Route::fresh::<UserHandler>("/user/{id}", Methods::GET))
        .build()
        .unwrap();
    let router = api.router().unwrap();

    let response = serve(&router, request(Method::GET, "/export/1.0/report", false)).await;
    assert_eq!(spy.renders.load(Ordering::SeqCst), 0);
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(response.body().as_ref(), b"a,b\n1,2\n");

    serve(&router, request(Method::GET, "/export/1.0/user/1?name=a", false)).await;
    assert_eq!(spy.renders.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Mount paths and documentation
// ---------------------------------------------------------------------------

#[test]
fn test_full_path_for_default_root() {
    let api = Api::builder("myapi", "1.0").build().unwrap();
    assert_eq!(api.full_path("/foo"), "/myapi/1.0/foo");
    assert_eq!(api.full_path("/foo"), api.full_path("/foo"));
    assert_eq!(api.full_path("/user/{id}"), "/myapi/1.0/user/:id");
}

proptest! {
    #[test]
    fn prop_mount_path_is_idempotent(
        segments in prop::collection::vec(("[a-z]{1,8}", any::<bool>()), 0..6),
    ) {
        let rel: String = segments
            .iter()
            .map(|(name, placeholder)| {
                if *placeholder { format!("/{{{name}}}") } else { format!("/{name}") }
            })
            .collect();
        let api = Api::builder("myapi", "1.0").build().unwrap();

        let first = api.full_path(&rel);
        let second = api.full_path(&rel);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.starts_with("/myapi/1.0"));
        prop_assert!(!first.contains('{'), "placeholder left in {}", first);
        for (name, placeholder) in &segments {
            if *placeholder {
                let expected = format!(":{}", name);
                prop_assert!(first.contains(&expected), "{} missing from {}", expected, first);
            }
        }
    }
}

#[tokio::test]
async fn test_swagger_describes_what_the_binder_enforces() {
    let api = user_api();
    let router = api.router().unwrap();

    let response = serve(&router, request(Method::GET, "/testung/1.0/swagger", false)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/json");

    let doc = body_json(&response);
    assert_eq!(doc["host"], "api.example.com");
    assert_eq!(doc["basePath"], "/testung/1.0");
    assert_eq!(doc["schemes"], json!(["http", "https"]));
    assert_eq!(doc["consumes"], json!(["text/json"]));

    let params = doc["paths"]["/user/{id}"]["get"]["parameters"].as_array().unwrap();
    let info = api.routes()[0].request_info();

    let documented_required: Vec<&str> = params
        .iter()
        .filter(|p| p["required"] == true)
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(documented_required, info.required());

    for p in info.params() {
        let doc_param = params.iter().find(|d| d["name"] == p.name.as_str()).unwrap();
        let expected_in = match p.source {
            ParamSource::Path => "path",
            ParamSource::Query => "query",
            ParamSource::Body => "formData",
        };
        assert_eq!(doc_param["in"], expected_in);
    }
    assert_eq!(params[1]["maxLength"], 100);
}

#[tokio::test]
async fn test_console_redirects_to_shared_page() {
    let router = user_api().router().unwrap();
    let response = serve(&router, request(Method::GET, "/testung/1.0/console", false)).await;

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers()[http::header::LOCATION],
        "/console?url=%2Ftestung%2F1.0%2Fswagger"
    );
}

// ---------------------------------------------------------------------------
// Observability
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_observer_receives_dispatch_diagnostics() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let api = Api::builder("vault", "1.0")
        .allow_insecure(true)
        .observer(tracing::Dispatch::new(subscriber))
        .security(ApiKeyScheme::query("key", ["k"]))
        .route(Route::fresh::<UserHandler>("/user/{id}", Methods::GET))
        .build()
        .unwrap();
    let router = api.router().unwrap();
    serve(&router, request(Method::GET, "/vault/1.0/user/1?name=a", false)).await;

    let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("registering handler"));
    assert!(output.contains("error validating security scheme"));
    assert!(output.contains("dispatch"));
}
