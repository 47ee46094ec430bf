//! Request-info: the parameter schema a route exposes for binding and docs.

use std::fmt;

use regex::Regex;

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// A named path segment (`/user/{id}`)
    Path,
    /// The query string
    Query,
    /// The request body (JSON object or urlencoded form)
    Body,
}

impl ParamSource {
    /// Lowercase name used in errors and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wire type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Text
    String,
    /// Whole number
    Integer,
    /// Floating point number
    Number,
    /// true / false
    Boolean,
    /// Repeated values of the inner kind
    Array(Box<ParamKind>),
}

impl ParamKind {
    /// The JSON-schema style type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
        }
    }
}

/// Declared value constraints for a parameter.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Maximum length in characters
    pub max_len: Option<usize>,
    /// Minimum length in characters
    pub min_len: Option<usize>,
    /// Inclusive numeric lower bound
    pub min: Option<f64>,
    /// Inclusive numeric upper bound
    pub max: Option<f64>,
    /// Regular expression every raw value must match
    pub pattern: Option<Regex>,
    /// Allowed raw values, empty when unrestricted
    pub one_of: Vec<String>,
    /// Raw value used when the parameter is absent
    pub default: Option<String>,
}

impl Constraints {
    /// Checks a raw value against the textual constraints.
    pub(crate) fn check_raw(&self, raw: &str) -> Result<(), String> {
        let len = raw.chars().count();
        if let Some(max) = self.max_len {
            if len > max {
                return Err(format!("exceeds maximum length {max}"));
            }
        }
        if let Some(min) = self.min_len {
            if len < min {
                return Err(format!("is shorter than minimum length {min}"));
            }
        }
        if let Some(re) = &self.pattern {
            if !re.is_match(raw) {
                return Err(format!("does not match pattern {}", re.as_str()));
            }
        }
        if !self.one_of.is_empty() && !self.one_of.iter().any(|v| v == raw) {
            return Err(format!("must be one of [{}]", self.one_of.join(", ")));
        }
        Ok(())
    }

    /// Checks a converted numeric value against `min`/`max`.
    pub(crate) fn check_range(&self, value: Option<f64>) -> Result<(), String> {
        let Some(value) = value else {
            return Ok(());
        };
        if let Some(min) = self.min {
            if value < min {
                return Err(format!("is below minimum {min}"));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(format!("is above maximum {max}"));
            }
        }
        Ok(())
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    /// Parameter name as it appears on the wire
    pub name: String,
    /// Where the value is read from
    pub source: ParamSource,
    /// Wire type
    pub kind: ParamKind,
    /// Optional format hint (`int32`, `double`, ...)
    pub format: Option<&'static str>,
    /// Whether absence fails binding
    pub required: bool,
    /// Value constraints
    pub constraints: Constraints,
    /// Human documentation
    pub doc: Option<String>,
}

/// The full parameter schema of a route's handler.
///
/// Derived once from the handler's [`crate::Schema`] during registration,
/// then shared read-only by the binder and the documentation export.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    params: Vec<ParamInfo>,
}

impl RequestInfo {
    /// Creates request-info from declared parameters.
    #[must_use]
    pub fn new(params: Vec<ParamInfo>) -> Self {
        Self { params }
    }

    /// All parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamInfo> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Names of required parameters, in declaration order.
    #[must_use]
    pub fn required(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the handler declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
