//! Drives a running server over real TCP connections.

use std::time::Duration;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use vertex_api::{Api, Route};
use vertex_config::ServerConfig;
use vertex_core::{BoxFuture, Handler, HandlerResult, Methods, Request, ResponseWriter};
use vertex_extract::{Bind, Param, Schema};
use vertex_server::{Server, ServerResult, ShutdownSignal, FORWARDED_PROTO_HEADER};

#[derive(Debug, Default)]
struct Greet {
    name: String,
}

impl Bind for Greet {
    fn schema() -> Schema<Self> {
        Schema::new().field(
            Param::path("name").required().max_len(20),
            |h: &mut Self, v: String| h.name = v,
        )
    }
}

impl Handler for Greet {
    fn handle<'a>(
        &'a self,
        _w: &'a mut ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            Ok(json!({
                "greeting": format!("hello {}", self.name),
                "bytes": req.body().len(),
            }))
        })
    }
}

fn greeter(allow_insecure: bool) -> Api {
    Api::builder("greeter", "2.0")
        .allow_insecure(allow_insecure)
        .route(Route::fresh::<Greet>("/hello/{name}", Methods::GET | Methods::POST))
        .build()
        .unwrap()
}

struct Running {
    addr: std::net::SocketAddr,
    shutdown: ShutdownSignal,
    task: JoinHandle<ServerResult<()>>,
}

impl Running {
    async fn stop(self) -> ServerResult<()> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("server stops within the grace period")
            .expect("server task does not panic")
    }
}

async fn start(config: ServerConfig, api: &Api) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(config).api(api).unwrap();
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(server.serve(listener, shutdown.clone()));
    Running {
        addr,
        shutdown,
        task,
    }
}

async fn send(
    running: &Running,
    method: Method,
    path: &str,
    headers: &[(&str, &str)],
    body: &'static [u8],
) -> (StatusCode, http::HeaderMap, Bytes) {
    let stream = TcpStream::connect(running.addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(conn);

    let mut builder = http::Request::builder()
        .method(method)
        .uri(path)
        .header("host", format!("localhost:{}", running.addr.port()));
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(Full::new(Bytes::from_static(body))).unwrap();

    let response = sender.send_request(req).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    (parts.status, parts.headers, bytes)
}

#[tokio::test]
async fn test_dispatch_over_tcp() {
    let running = start(ServerConfig::default(), &greeter(true)).await;

    let (status, _, body) = send(&running, Method::GET, "/greeter/2.0/hello/ada", &[], b"").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["greeting"], "hello ada");

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_post_body_reaches_handler() {
    let running = start(ServerConfig::default(), &greeter(true)).await;

    let (status, _, body) = send(
        &running,
        Method::POST,
        "/greeter/2.0/hello/ada",
        &[("content-type", "text/plain")],
        b"twelve bytes",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["bytes"], 12);

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_validation_failure_over_tcp() {
    let running = start(ServerConfig::default(), &greeter(true)).await;

    let long = "/greeter/2.0/hello/abcdefghijklmnopqrstuvwxyz";
    let (status, _, body) = send(&running, Method::GET, long, &[], b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["details"]["field"], "name");

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_insecure_transport_forbidden() {
    let running = start(ServerConfig::default(), &greeter(false)).await;

    let path = "/greeter/2.0/hello/ada";
    let (status, _, body) = send(&running, Method::GET, path, &[], b"").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(&body[..], b"Insecure access forbidden");

    // A direct client cannot claim https unless the proxy header is trusted.
    let forwarded = [(FORWARDED_PROTO_HEADER, "https")];
    let (status, _, _) = send(&running, Method::GET, path, &forwarded, b"").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_trusted_forwarded_proto_allows_access() {
    let config = ServerConfig {
        trust_forwarded_proto: true,
        ..ServerConfig::default()
    };
    let running = start(config, &greeter(false)).await;

    let path = "/greeter/2.0/hello/ada";
    let forwarded = [(FORWARDED_PROTO_HEADER, "https")];
    let (status, _, _) = send(&running, Method::GET, path, &forwarded, b"").await;
    assert_eq!(status, StatusCode::OK);

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_body_limit() {
    let config = ServerConfig {
        max_body_bytes: 8,
        ..ServerConfig::default()
    };
    let running = start(config, &greeter(true)).await;

    let (status, _, _) = send(
        &running,
        Method::POST,
        "/greeter/2.0/hello/ada",
        &[],
        b"this body is longer than eight bytes",
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_swagger_and_console() {
    let running = start(ServerConfig::default(), &greeter(true)).await;

    let (status, headers, body) =
        send(&running, Method::GET, "/greeter/2.0/swagger", &[], b"").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "text/json");
    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(doc["host"], format!("localhost:{}", running.addr.port()));
    assert_eq!(doc["basePath"], "/greeter/2.0");
    assert!(doc["paths"]["/hello/{name}"]["get"].is_object());
    assert!(doc["paths"]["/hello/{name}"]["post"].is_object());

    let (status, headers, _) = send(&running, Method::GET, "/greeter/2.0/console", &[], b"").await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    let location = headers["location"].to_str().unwrap().to_string();
    assert_eq!(location, "/console?url=%2Fgreeter%2F2.0%2Fswagger");

    let (status, _, page) = send(&running, Method::GET, &location, &[], b"").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&page).contains("swagger-ui"));

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_not_found_and_method_not_allowed() {
    let running = start(ServerConfig::default(), &greeter(true)).await;

    let (status, _, _) = send(&running, Method::GET, "/elsewhere", &[], b"").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, headers, _) =
        send(&running, Method::DELETE, "/greeter/2.0/hello/ada", &[], b"").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(headers["allow"].to_str().unwrap().contains("POST"));

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_without_traffic() {
    let running = start(
        ServerConfig {
            shutdown_timeout_secs: 1,
            ..ServerConfig::default()
        },
        &greeter(true),
    )
    .await;
    running.stop().await.unwrap();
}
