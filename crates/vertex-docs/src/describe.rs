//! Route metadata handed over for export.

use indexmap::IndexMap;
use vertex_core::Methods;
use vertex_extract::RequestInfo;

use crate::error::{DocsError, DocsResult};
use crate::swagger::{Info, Operation, Parameter, PathItem, Response, Swagger};

/// What the documentation knows about one route.
#[derive(Debug, Clone)]
pub struct RouteDescription {
    /// Path template as declared, placeholders in `{name}` form.
    pub path: String,
    /// Methods the route answers.
    pub methods: Methods,
    /// Human description.
    pub description: Option<String>,
    /// Parameter schema shared with the binder.
    pub request_info: RequestInfo,
}

impl RouteDescription {
    /// Describes a route without a description.
    #[must_use]
    pub fn new(path: impl Into<String>, methods: Methods, request_info: RequestInfo) -> Self {
        Self {
            path: path.into(),
            methods,
            description: None,
            request_info,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// What the documentation knows about one API.
#[derive(Debug, Clone)]
pub struct ApiDescription {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// Longer description.
    pub description: Option<String>,
    /// Mount prefix of every route.
    pub base_path: String,
    /// Whether plain HTTP is accepted.
    pub allow_insecure: bool,
    /// Renderer content types.
    pub produces: Vec<String>,
    /// Routes in registration order.
    pub routes: Vec<RouteDescription>,
}

impl ApiDescription {
    /// Creates an empty description.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        version: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            base_path: base_path.into(),
            allow_insecure: false,
            produces: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets whether plain HTTP is accepted.
    #[must_use]
    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Sets the response content types.
    #[must_use]
    pub fn produces(mut self, content_types: Vec<String>) -> Self {
        self.produces = content_types;
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, route: RouteDescription) -> Self {
        self.routes.push(route);
        self
    }

    /// Builds the Swagger document as served to `host`.
    ///
    /// Routes sharing a declared path are merged into one path item; a
    /// method declared twice on the same path is an error.
    pub fn to_swagger(&self, host: Option<&str>) -> DocsResult<Swagger> {
        let schemes = if self.allow_insecure {
            vec!["http".to_string(), "https".to_string()]
        } else {
            vec!["https".to_string()]
        };

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        for route in &self.routes {
            let parameters: Vec<Parameter> = route
                .request_info
                .params()
                .iter()
                .map(Parameter::from)
                .collect();
            let item = paths.entry(route.path.clone()).or_default();

            for method in route.methods.iter() {
                let slot = item.slot_mut(&method).ok_or_else(|| DocsError::UnsupportedMethod {
                    method: method.to_string(),
                })?;
                if slot.is_some() {
                    return Err(DocsError::DuplicateOperation {
                        path: route.path.clone(),
                        method: method.to_string(),
                    });
                }
                *slot = Some(Operation {
                    description: route.description.clone(),
                    parameters: parameters.clone(),
                    responses: default_responses(),
                });
            }
        }

        Ok(Swagger {
            swagger: "2.0".to_string(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
            },
            host: host.map(str::to_string),
            base_path: self.base_path.clone(),
            schemes,
            consumes: vec![crate::SWAGGER_CONTENT_TYPE.to_string()],
            produces: self.produces.clone(),
            paths,
        })
    }

    /// The document as indented JSON.
    pub fn to_json(&self, host: Option<&str>) -> DocsResult<String> {
        let doc = self.to_swagger(host)?;
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

fn default_responses() -> IndexMap<String, Response> {
    let mut responses = IndexMap::new();
    responses.insert(
        "200".to_string(),
        Response {
            description: "success".to_string(),
        },
    );
    responses.insert(
        "default".to_string(),
        Response {
            description: "error envelope".to_string(),
        },
    );
    responses
}
