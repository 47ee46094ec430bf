//! Versioned APIs and their registration on a router.

use std::sync::Arc;

use http::{HeaderValue, Method};
use vertex_core::{JsonRenderer, Renderer, SecurityScheme};
use vertex_docs::{console_location, ApiDescription, DocsResult, RouteDescription, Swagger};
use vertex_middleware::{build_chain, BoxedMiddleware, Chain, Middleware};
use vertex_router::Router;

use crate::dispatch::{Dispatch, HandlerStep};
use crate::endpoint::{Endpoint, RedirectEndpoint, SwaggerEndpoint};
use crate::error::{ApiError, ApiResult};
use crate::path::{default_root, join, rewrite_placeholders};
use crate::route::Route;

/// The router type APIs register on.
pub type EndpointRouter = Router<Arc<dyn Endpoint>>;

/// A named, versioned bundle of routes.
///
/// Built with [`Api::builder`]. Shape is fixed once built; the only later
/// change is each route deriving its request-info on registration.
pub struct Api {
    name: String,
    title: String,
    version: String,
    root: String,
    doc: Option<String>,
    security: Option<Arc<dyn SecurityScheme>>,
    renderer: Arc<dyn Renderer>,
    routes: Vec<Route>,
    middleware: Vec<BoxedMiddleware>,
    allow_insecure: bool,
    observer: Option<tracing::Dispatch>,
}

impl Api {
    /// Starts building an API called `name` at `version`.
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> ApiBuilder {
        ApiBuilder::new(name, version)
    }

    /// API name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// API version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Longer description.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Routes in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Whether plain HTTP is accepted by default.
    pub fn allow_insecure(&self) -> bool {
        self.allow_insecure
    }

    /// The renderer shared by every route.
    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Mount prefix: the explicit root, or `/{name}/{version}`.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Full mount path of `rel` inside the API, placeholders rewritten to
    /// the router's syntax.
    ///
    /// ```
    /// let api = vertex_api::Api::builder("myapi", "1.0").build().unwrap();
    /// assert_eq!(api.full_path("/foo"), "/myapi/1.0/foo");
    /// assert_eq!(api.full_path("/user/{id}"), "/myapi/1.0/user/:id");
    /// ```
    pub fn full_path(&self, rel: &str) -> String {
        let rel = rewrite_placeholders(rel);
        let full = join(&self.root, &rel);
        tracing::debug!(rel = %rel, full = %full, "computed full path");
        full
    }

    /// Builds the dispatch function of `route`, deriving its request-info
    /// first.
    pub fn dispatch(&self, route: &Route) -> ApiResult<Dispatch> {
        route.parse_info().map_err(|source| ApiError::Schema {
            path: route.path().to_string(),
            source,
        })?;

        let security = route.security_scheme().or(self.security.as_ref()).cloned();
        let allow_insecure = route.insecure_override().unwrap_or(self.allow_insecure);

        let combined: Vec<BoxedMiddleware> = self
            .middleware
            .iter()
            .chain(route.route_middleware())
            .cloned()
            .collect();
        let step: BoxedMiddleware = Arc::new(HandlerStep::new(route.path(), Arc::clone(route.prototype())));
        let chain = match build_chain(combined) {
            Some(mut chain) => {
                chain.append(step);
                chain
            }
            None => Chain::new(step),
        };

        Ok(Dispatch::new(
            self.name.clone(),
            route.path(),
            allow_insecure,
            security,
            chain.seal(),
            Arc::clone(&self.renderer),
        )
        .with_observer(self.observer.clone()))
    }

    /// What the documentation export knows about this API.
    pub fn description(&self) -> ApiDescription {
        let mut description = ApiDescription::new(&self.title, &self.version, self.full_path(""))
            .allow_insecure(self.allow_insecure)
            .produces(self.renderer.content_types());
        if let Some(doc) = &self.doc {
            description = description.description(doc);
        }
        for route in &self.routes {
            let mut rd = RouteDescription::new(route.path(), route.methods(), route.request_info().clone());
            if let Some(text) = route.route_description() {
                rd = rd.description(text);
            }
            description = description.route(rd);
        }
        description
    }

    /// The Swagger document as served to `host`.
    pub fn to_swagger(&self, host: Option<&str>) -> DocsResult<Swagger> {
        self.description().to_swagger(host)
    }

    /// Registers every route, plus `{root}/swagger` and the
    /// `{root}/console` redirect, on `router`.
    pub fn configure(&self, router: &mut EndpointRouter) -> ApiResult<()> {
        let _observed = self.observer.as_ref().map(tracing::dispatcher::set_default);

        for route in &self.routes {
            if route.methods().is_empty() {
                return Err(ApiError::NoMethods {
                    path: route.path().to_string(),
                });
            }
            let endpoint: Arc<dyn Endpoint> = Arc::new(self.dispatch(route)?);
            let path = self.full_path(route.path());
            for method in route.methods().iter() {
                tracing::info!(api = %self.name, method = %method, path = %path, "registering handler");
                register(router, method, &path, Arc::clone(&endpoint))?;
            }
        }

        let swagger_path = self.full_path("/swagger");
        let description = self.description();
        description.to_swagger(None)?;
        let swagger: Arc<dyn Endpoint> = Arc::new(SwaggerEndpoint::new(description));
        register(router, Method::GET, &swagger_path, swagger)?;

        let location = console_location(&swagger_path)?;
        let location_value = HeaderValue::try_from(location.as_str())
            .map_err(|_| ApiError::Redirect { location: location.clone() })?;
        let console: Arc<dyn Endpoint> = Arc::new(RedirectEndpoint::permanent(location_value));
        register(router, Method::GET, &self.full_path("/console"), console)?;

        tracing::info!(api = %self.name, version = %self.version, root = %self.root, "api configured");
        Ok(())
    }

    /// A router holding only this API.
    pub fn router(&self) -> ApiResult<EndpointRouter> {
        let mut router = EndpointRouter::new();
        self.configure(&mut router)?;
        Ok(router)
    }
}

fn register(
    router: &mut EndpointRouter,
    method: Method,
    path: &str,
    endpoint: Arc<dyn Endpoint>,
) -> ApiResult<()> {
    router
        .register(method, path, endpoint)
        .map_err(|source| ApiError::Route {
            path: path.to_string(),
            source,
        })
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("root", &self.root)
            .field("routes", &self.routes)
            .field("middleware", &self.middleware.len())
            .field("allow_insecure", &self.allow_insecure)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Api`].
pub struct ApiBuilder {
    name: String,
    title: Option<String>,
    version: String,
    root: Option<String>,
    doc: Option<String>,
    security: Option<Arc<dyn SecurityScheme>>,
    renderer: Arc<dyn Renderer>,
    routes: Vec<Route>,
    middleware: Vec<BoxedMiddleware>,
    allow_insecure: bool,
    observer: Option<tracing::Dispatch>,
}

impl ApiBuilder {
    fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            version: version.into(),
            root: None,
            doc: None,
            security: None,
            renderer: Arc::new(JsonRenderer),
            routes: Vec::new(),
            middleware: Vec::new(),
            allow_insecure: false,
            observer: None,
        }
    }

    /// Human title; defaults to the name.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Explicit mount prefix instead of `/{name}/{version}`.
    #[must_use]
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Longer description.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Default security scheme for routes without their own.
    #[must_use]
    pub fn security<S: SecurityScheme + 'static>(mut self, scheme: S) -> Self {
        self.security = Some(Arc::new(scheme));
        self
    }

    /// Renderer; defaults to [`JsonRenderer`].
    #[must_use]
    pub fn renderer<R: Renderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Appends an API-level middleware. These run before route middleware.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends already shared API-level middleware.
    #[must_use]
    pub fn with_middleware(mut self, middleware: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        self.middleware.extend(middleware);
        self
    }

    /// Accepts plain HTTP for routes without their own policy.
    #[must_use]
    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Sends this API's diagnostics to `observer` instead of the global
    /// subscriber.
    #[must_use]
    pub fn observer(mut self, observer: tracing::Dispatch) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the API.
    pub fn build(self) -> ApiResult<Api> {
        if self.name.is_empty() {
            return Err(ApiError::MissingName);
        }
        if self.version.is_empty() {
            return Err(ApiError::MissingVersion { name: self.name });
        }
        let root = match self.root.as_deref() {
            Some(root) if !root.is_empty() => join("/", root),
            _ => default_root(&self.name, &self.version),
        };
        Ok(Api {
            title: self.title.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            version: self.version,
            root,
            doc: self.doc,
            security: self.security,
            renderer: self.renderer,
            routes: self.routes,
            middleware: self.middleware,
            allow_insecure: self.allow_insecure,
            observer: self.observer,
        })
    }
}
