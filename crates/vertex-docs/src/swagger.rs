//! Swagger 2.0 document types.
//!
//! Only the parts of the format a Vertex API can describe are modelled:
//! flat parameters read from the path, the query string or the form body.
//! See <https://swagger.io/specification/v2/>.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vertex_extract::{ParamInfo, ParamKind, ParamSource};

/// Swagger document root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swagger {
    /// Format version, always "2.0".
    pub swagger: String,
    /// API metadata.
    pub info: Info,
    /// Host (and optional port) serving the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Path prefix shared by every route.
    #[serde(rename = "basePath")]
    pub base_path: String,
    /// Accepted transport schemes.
    pub schemes: Vec<String>,
    /// Accepted request content types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    /// Response content types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    /// Operations keyed by declared route path.
    pub paths: IndexMap<String, PathItem>,
}

/// API metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The operations available on one path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    /// Mutable slot for `method`, or `None` if the format has no slot for it.
    pub fn slot_mut(&mut self, method: &http::Method) -> Option<&mut Option<Operation>> {
        match *method {
            http::Method::GET => Some(&mut self.get),
            http::Method::PUT => Some(&mut self.put),
            http::Method::POST => Some(&mut self.post),
            http::Method::DELETE => Some(&mut self.delete),
            http::Method::PATCH => Some(&mut self.patch),
            _ => None,
        }
    }

    /// Operations in document order with their lowercase method names.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("patch", &self.patch),
        ]
        .into_iter()
        .filter_map(|(name, op)| op.as_ref().map(|op| (name, op)))
    }
}

/// One method on one path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Route description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
}

/// A documented response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Response description.
    pub description: String,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterIn {
    /// URL path segment.
    Path,
    /// Query string.
    Query,
    /// Form or JSON body field.
    FormData,
}

impl From<ParamSource> for ParameterIn {
    fn from(source: ParamSource) -> Self {
        match source {
            ParamSource::Path => Self::Path,
            ParamSource::Query => Self::Query,
            ParamSource::Body => Self::FormData,
        }
    }
}

/// A documented parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the binder rejects requests without it.
    #[serde(default)]
    pub required: bool,
    /// Wire type.
    #[serde(rename = "type")]
    pub param_type: String,
    /// Format hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Element type for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    /// How repeated values are sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "collectionFormat")]
    pub collection_format: Option<String>,
    /// Maximum length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxLength")]
    pub max_length: Option<usize>,
    /// Minimum length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "minLength")]
    pub min_length: Option<usize>,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Regular expression values must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "enum")]
    pub enum_values: Vec<Value>,
    /// Value used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Array element type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Items {
    /// Element wire type.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Element format hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl From<&ParamInfo> for Parameter {
    fn from(info: &ParamInfo) -> Self {
        let c = &info.constraints;
        let format = info.format.map(str::to_string);
        let (format, items, collection_format) = match &info.kind {
            ParamKind::Array(inner) => (
                None,
                Some(Items {
                    item_type: inner.type_name().to_string(),
                    format,
                }),
                Some("multi".to_string()),
            ),
            _ => (format, None, None),
        };
        let scalar = match &info.kind {
            ParamKind::Array(inner) => inner.as_ref(),
            kind => kind,
        };

        Self {
            name: info.name.clone(),
            location: info.source.into(),
            description: info.doc.clone(),
            required: info.required,
            param_type: info.kind.type_name().to_string(),
            format,
            items,
            collection_format,
            max_length: c.max_len,
            min_length: c.min_len,
            minimum: c.min,
            maximum: c.max,
            pattern: c.pattern.as_ref().map(|re| re.as_str().to_string()),
            enum_values: c.one_of.iter().map(|v| typed_value(scalar, v)).collect(),
            default: c.default.as_deref().map(|v| typed_value(scalar, v)),
        }
    }
}

/// Renders a raw value as JSON of the declared kind, falling back to a string.
fn typed_value(kind: &ParamKind, raw: &str) -> Value {
    let parsed = match kind {
        ParamKind::Integer => raw.parse::<i64>().ok().map(Value::from),
        ParamKind::Number => raw.parse::<f64>().ok().map(Value::from),
        ParamKind::Boolean => raw.parse::<bool>().ok().map(Value::from),
        ParamKind::String | ParamKind::Array(_) => None,
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}
