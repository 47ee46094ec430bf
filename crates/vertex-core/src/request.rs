//! The per-request wrapper passed through security, middleware and handlers.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Extensions, HeaderMap, Method, Uri};

use crate::form::FormValues;

/// Correlation id attached to a request by the request-id middleware.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound request with its transport flag and merged parameters.
///
/// Owned by exactly one dispatch invocation. `form` holds urlencoded body
/// values followed by query values, and receives the router's path
/// parameters during dispatch. `body_form` holds the body values alone.
#[derive(Debug)]
pub struct Request {
    inner: http::Request<Bytes>,
    secure: bool,
    form: FormValues,
    body_form: FormValues,
}

impl Request {
    /// Wraps a buffered HTTP request. The request is treated as insecure
    /// until [`Request::with_secure`] says otherwise.
    #[must_use]
    pub fn new(inner: http::Request<Bytes>) -> Self {
        let body_form = if is_form_body(&inner) {
            FormValues::parse_bytes(inner.body())
        } else {
            FormValues::new()
        };

        let mut form = body_form.clone();
        if let Some(query) = inner.uri().query() {
            form.extend(FormValues::parse(query));
        }

        Self {
            inner,
            secure: false,
            form,
            body_form,
        }
    }

    /// Marks the request as arriving over an encrypted transport.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Returns true if the request arrived over an encrypted transport.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// URI path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns a header value if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Host` header, or the URI authority for absolute-form requests.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.header("host")
            .or_else(|| self.inner.uri().authority().map(http::uri::Authority::as_str))
    }

    /// Returns true if the body is declared as JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.header(CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.contains("json"))
    }

    /// Raw request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// Merged parameter values.
    #[must_use]
    pub fn form(&self) -> &FormValues {
        &self.form
    }

    /// Values decoded from a urlencoded body only. Empty for other bodies.
    #[must_use]
    pub fn body_form(&self) -> &FormValues {
        &self.body_form
    }

    /// Mutable access to the merged parameter values.
    pub fn form_mut(&mut self) -> &mut FormValues {
        &mut self.form
    }

    /// First value of a merged parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.form.get(name)
    }

    /// Merges router-extracted path parameters into the value set.
    ///
    /// A path parameter replaces every same-named query or body value.
    pub fn merge_path_params<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.form.set(name, value);
        }
    }

    /// Request extensions.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    /// Mutable request extensions.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.inner.extensions_mut()
    }

    /// The correlation id, if the request-id middleware ran.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.extensions().get::<RequestId>().map(RequestId::as_str)
    }

    /// Unwraps the underlying HTTP request.
    #[must_use]
    pub fn into_inner(self) -> http::Request<Bytes> {
        self.inner
    }
}

fn is_form_body(req: &http::Request<Bytes>) -> bool {
    matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH)
        && req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(method: Method, uri: &str, content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = http::Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        Request::new(builder.body(Bytes::from_static(body.as_bytes())).unwrap())
    }

    #[test]
    fn test_query_parsed() {
        let req = build(Method::GET, "/user/1?name=bob&tag=a&tag=b", None, "");
        assert_eq!(req.param("name"), Some("bob"));
        assert_eq!(req.form().get_all("tag").len(), 2);
        assert_eq!(req.path(), "/user/1");
        assert!(!req.is_secure());
    }

    #[test]
    fn test_urlencoded_body_merged() {
        let req = build(
            Method::POST,
            "/user?source=query",
            Some("application/x-www-form-urlencoded"),
            "name=alice",
        );
        assert_eq!(req.param("name"), Some("alice"));
        assert_eq!(req.param("source"), Some("query"));
        assert_eq!(req.body_form().get("name"), Some("alice"));
        assert_eq!(req.body_form().get("source"), None);
    }

    #[test]
    fn test_body_values_precede_query_values() {
        let req = build(
            Method::POST,
            "/user?name=from-query",
            Some("application/x-www-form-urlencoded"),
            "name=from-body",
        );
        assert_eq!(req.form().get_all("name"), ["from-body", "from-query"]);
        assert_eq!(req.body_form().get_all("name"), ["from-body"]);
    }

    #[test]
    fn test_non_utf8_form_body_decoded_lossily() {
        let raw = http::Request::builder()
            .method(Method::POST)
            .uri("/user")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Bytes::from_static(b"name=caf\xe9&id=7"))
            .unwrap();
        let req = Request::new(raw);
        assert_eq!(req.body_form().get("id"), Some("7"));
        assert_eq!(req.body_form().get("name"), Some("caf\u{fffd}"));
    }

    #[test]
    fn test_json_body_not_parsed_as_form() {
        let req = build(Method::POST, "/user", Some("application/json"), "{\"name\":\"x\"}");
        assert!(req.form().is_empty());
        assert!(req.is_json());
    }

    #[test]
    fn test_path_params_win() {
        let mut req = build(Method::GET, "/user/42?id=7&id=8", None, "");
        req.merge_path_params([("id", "42")]);
        assert_eq!(req.form().get_all("id"), ["42".to_string()]);
    }

    #[test]
    fn test_secure_flag_and_request_id() {
        let mut req = build(Method::GET, "/", None, "").with_secure(true);
        assert!(req.is_secure());
        assert_eq!(req.request_id(), None);
        req.extensions_mut().insert(RequestId("abc".to_string()));
        assert_eq!(req.request_id(), Some("abc"));
    }

    #[test]
    fn test_host_header() {
        let inner = http::Request::builder()
            .uri("/x")
            .header("host", "api.example.com")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(Request::new(inner).host(), Some("api.example.com"));
    }
}
