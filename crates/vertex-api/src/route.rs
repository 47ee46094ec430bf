//! Declarative endpoint descriptions.

use std::sync::{Arc, OnceLock};

use vertex_core::{Handler, Methods, SecurityScheme};
use vertex_extract::{fresh, shared, Bind, BindError, Prototype, RequestInfo};
use vertex_middleware::{BoxedMiddleware, Middleware};

/// One endpoint of an API.
///
/// ```rust,ignore
/// let route = Route::fresh::<UserHandler>("/user/{id}", Methods::GET)
///     .description("Fetch a user")
///     .middleware(AuditLog);
/// ```
pub struct Route {
    path: String,
    methods: Methods,
    prototype: Arc<dyn Prototype>,
    security: Option<Arc<dyn SecurityScheme>>,
    middleware: Vec<BoxedMiddleware>,
    description: Option<String>,
    allow_insecure: Option<bool>,
    request_info: OnceLock<RequestInfo>,
}

impl Route {
    /// A route served by `prototype`.
    pub fn new(path: impl Into<String>, methods: Methods, prototype: Arc<dyn Prototype>) -> Self {
        Self {
            path: path.into(),
            methods,
            prototype,
            security: None,
            middleware: Vec::new(),
            description: None,
            allow_insecure: None,
            request_info: OnceLock::new(),
        }
    }

    /// A route that builds and binds a new `H` for every request.
    pub fn fresh<H: Handler + Bind + Default>(path: impl Into<String>, methods: Methods) -> Self {
        Self::new(path, methods, fresh::<H>())
    }

    /// A route that serves every request with the one `handler`.
    ///
    /// Concurrent requests use the handler at the same time; parameters are
    /// validated but not written into it.
    pub fn shared<H: Handler + Bind>(
        path: impl Into<String>,
        methods: Methods,
        handler: H,
    ) -> Self {
        Self::new(path, methods, shared(handler))
    }

    /// Overrides the API's security scheme for this route.
    #[must_use]
    pub fn security<S: SecurityScheme + 'static>(mut self, scheme: S) -> Self {
        self.security = Some(Arc::new(scheme));
        self
    }

    /// Appends a middleware that runs after the API's middleware.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends already shared middleware.
    #[must_use]
    pub fn with_middleware(mut self, middleware: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        self.middleware.extend(middleware);
        self
    }

    /// Sets the human description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the API's insecure-transport policy for this route.
    #[must_use]
    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = Some(allow);
        self
    }

    /// Declared path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Methods the route answers.
    pub fn methods(&self) -> Methods {
        self.methods
    }

    /// The route's description, if any.
    pub fn route_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The route-level security override.
    pub fn security_scheme(&self) -> Option<&Arc<dyn SecurityScheme>> {
        self.security.as_ref()
    }

    /// Route-level middleware in declaration order.
    pub fn route_middleware(&self) -> &[BoxedMiddleware] {
        &self.middleware
    }

    /// The route-level insecure-transport override.
    pub fn insecure_override(&self) -> Option<bool> {
        self.allow_insecure
    }

    /// The handler factory.
    pub fn prototype(&self) -> &Arc<dyn Prototype> {
        &self.prototype
    }

    /// Parses the request-info, checking the schema first.
    ///
    /// The schema is derived once; later calls return the stored value.
    pub fn parse_info(&self) -> Result<&RequestInfo, BindError> {
        if let Some(info) = self.request_info.get() {
            return Ok(info);
        }
        self.prototype.check()?;
        Ok(self.request_info.get_or_init(|| self.prototype.request_info()))
    }

    /// The request-info, derived on first use.
    pub fn request_info(&self) -> &RequestInfo {
        self.request_info.get_or_init(|| self.prototype.request_info())
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field("shared", &self.prototype.is_shared())
            .field("middleware", &self.middleware.len())
            .field("allow_insecure", &self.allow_insecure)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vertex_core::{BoxFuture, HandlerResult, Request, ResponseWriter};
    use vertex_extract::{Param, Schema};

    #[derive(Default)]
    struct Lookup {
        id: u32,
    }

    impl Bind for Lookup {
        fn schema() -> Schema<Self> {
            Schema::new().field(Param::path("id").required(), |h: &mut Self, v: u32| h.id = v)
        }
    }

    impl Handler for Lookup {
        fn handle<'a>(
            &'a self,
            _w: &'a mut ResponseWriter,
            _req: &'a Request,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move { Ok(serde_json::json!(self.id)) })
        }
    }

    #[derive(Default)]
    struct BadPattern;

    impl Bind for BadPattern {
        fn schema() -> Schema<Self> {
            Schema::new().field(Param::query("q").pattern("("), |_: &mut Self, _: String| {})
        }
    }

    impl Handler for BadPattern {
        fn handle<'a>(
            &'a self,
            _w: &'a mut ResponseWriter,
            _req: &'a Request,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async { Ok(serde_json::Value::Null) })
        }
    }

    #[test]
    fn test_builder_fields() {
        let route = Route::fresh::<Lookup>("/lookup/{id}", Methods::GET | Methods::DELETE)
            .description("Look something up")
            .allow_insecure(true);

        assert_eq!(route.path(), "/lookup/{id}");
        assert!(route.methods().contains(Methods::DELETE));
        assert_eq!(route.route_description(), Some("Look something up"));
        assert_eq!(route.insecure_override(), Some(true));
        assert!(route.security_scheme().is_none());
        assert!(!route.prototype().is_shared());
    }

    #[test]
    fn test_parse_info_is_stable() {
        let route = Route::shared("/lookup/{id}", Methods::GET, Lookup::default());
        let first = route.parse_info().unwrap() as *const RequestInfo;
        let second = route.parse_info().unwrap() as *const RequestInfo;
        assert_eq!(first, second);
        assert_eq!(route.request_info().required(), vec!["id"]);
    }

    #[test]
    fn test_parse_info_reports_bad_schema() {
        let route = Route::fresh::<BadPattern>("/search", Methods::GET);
        let err = route.parse_info().unwrap_err();
        assert!(matches!(err, BindError::Schema { ref field, .. } if field == "q"));
    }
}
