//! Typed parameter schemas and the binder that enforces them.
//!
//! A [`Schema`] is built once per handler type: each field pairs a
//! [`Param`] declaration with a setter that writes the converted value
//! into the handler. The same declarations become the route's
//! [`RequestInfo`], so the documented contract and the enforced one cannot
//! drift apart.

use regex::Regex;
use serde_json::{Map, Value};
use vertex_core::Request;

use crate::convert::FromParam;
use crate::error::BindError;
use crate::info::{Constraints, ParamInfo, ParamKind, ParamSource, RequestInfo};

/// Declaration of one parameter: name, source, requirement and constraints.
///
/// ```rust
/// use vertex_extract::{Param, ParamSource};
///
/// let p = Param::path("id").required().doc("The user id");
/// assert_eq!(p.source(), ParamSource::Path);
/// ```
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    source: ParamSource,
    required: bool,
    constraints: Constraints,
    pattern: Option<String>,
    doc: Option<String>,
}

impl Param {
    /// A query parameter (also found in urlencoded bodies).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ParamSource::Query,
            required: false,
            constraints: Constraints::default(),
            pattern: None,
            doc: None,
        }
    }

    /// A path parameter.
    #[must_use]
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name).in_path()
    }

    /// A query parameter.
    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name)
    }

    /// A body parameter.
    #[must_use]
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name).in_body()
    }

    /// Reads the value from the path.
    #[must_use]
    pub fn in_path(mut self) -> Self {
        self.source = ParamSource::Path;
        self
    }

    /// Reads the value from the body.
    #[must_use]
    pub fn in_body(mut self) -> Self {
        self.source = ParamSource::Body;
        self
    }

    /// Fails binding when the value is absent or empty.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Maximum length in characters.
    #[must_use]
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints.max_len = Some(max);
        self
    }

    /// Minimum length in characters.
    #[must_use]
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints.min_len = Some(min);
        self
    }

    /// Inclusive numeric lower bound.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.constraints.min = Some(min);
        self
    }

    /// Inclusive numeric upper bound.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.constraints.max = Some(max);
        self
    }

    /// Regular expression each raw value must match. Compiled when the
    /// field is added to a schema.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Restricts raw values to a fixed set.
    #[must_use]
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.one_of = values.into_iter().map(Into::into).collect();
        self
    }

    /// Raw value used when the parameter is absent.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.constraints.default = Some(value.into());
        self
    }

    /// Documentation string.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter source.
    #[must_use]
    pub fn source(&self) -> ParamSource {
        self.source
    }
}

/// Why a single field failed, before the field name is attached.
enum FieldFailure {
    Invalid(String),
    Constraint(String),
}

type Apply<H> = Box<dyn Fn(Option<&mut H>, &[String]) -> Result<(), FieldFailure> + Send + Sync>;

struct Field<H> {
    info: ParamInfo,
    apply: Apply<H>,
}

/// Parameter schema for handler type `H`.
///
/// # Example
///
/// ```rust
/// use vertex_extract::{Param, Schema};
///
/// #[derive(Default)]
/// struct UserHandler {
///     id: String,
///     name: String,
/// }
///
/// let schema = Schema::new()
///     .field(Param::path("id").required(), |h: &mut UserHandler, v: String| h.id = v)
///     .field(Param::query("name").required().max_len(100), |h: &mut UserHandler, v: String| {
///         h.name = v;
///     });
///
/// assert_eq!(schema.request_info().required(), vec!["id", "name"]);
/// ```
pub struct Schema<H> {
    fields: Vec<Field<H>>,
    invalid: Option<BindError>,
}

impl<H> Default for Schema<H> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            invalid: None,
        }
    }
}

impl<H> std::fmt::Debug for Schema<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field(
                "params",
                &self.fields.iter().map(|fld| &fld.info.name).collect::<Vec<_>>(),
            )
            .field("invalid", &self.invalid)
            .finish()
    }
}

impl<H: 'static> Schema<H> {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single-valued field. The first non-empty value is used.
    #[must_use]
    pub fn field<T, F>(mut self, param: Param, setter: F) -> Self
    where
        T: FromParam + 'static,
        F: Fn(&mut H, T) + Send + Sync + 'static,
    {
        let constraints = self.compile(&param);
        let checks = constraints.clone();
        let apply: Apply<H> = Box::new(
            move |target: Option<&mut H>, values: &[String]| -> Result<(), FieldFailure> {
                let Some(raw) = values.iter().find(|v| !v.is_empty()) else {
                    return Ok(());
                };
                let value = convert::<T>(raw, &checks)?;
                if let Some(target) = target {
                    setter(target, value);
                }
                Ok(())
            },
        );
        self.push(param, T::kind(), T::format(), constraints, apply);
        self
    }

    /// Adds a list field bound from every value of a repeated parameter.
    #[must_use]
    pub fn list<T, F>(mut self, param: Param, setter: F) -> Self
    where
        T: FromParam + 'static,
        F: Fn(&mut H, Vec<T>) + Send + Sync + 'static,
    {
        let constraints = self.compile(&param);
        let checks = constraints.clone();
        let apply: Apply<H> = Box::new(
            move |target: Option<&mut H>, values: &[String]| -> Result<(), FieldFailure> {
                let converted = values
                    .iter()
                    .map(|raw| convert::<T>(raw, &checks))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(target) = target {
                    setter(target, converted);
                }
                Ok(())
            },
        );
        let kind = ParamKind::Array(Box::new(T::kind()));
        self.push(param, kind, T::format(), constraints, apply);
        self
    }

    /// Resolves the declared constraints, compiling any pattern.
    fn compile(&mut self, param: &Param) -> Constraints {
        let mut constraints = param.constraints.clone();
        if let Some(pattern) = &param.pattern {
            match Regex::new(pattern) {
                Ok(re) => constraints.pattern = Some(re),
                Err(e) => {
                    self.invalid.get_or_insert(BindError::Schema {
                        field: param.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        constraints
    }

    fn push(
        &mut self,
        param: Param,
        kind: ParamKind,
        format: Option<&'static str>,
        constraints: Constraints,
        apply: Apply<H>,
    ) {
        let info = ParamInfo {
            name: param.name,
            source: param.source,
            kind,
            format,
            required: param.required,
            constraints,
            doc: param.doc,
        };
        self.fields.push(Field { info, apply });
    }
}

impl<H> Schema<H> {
    /// The request-info derived from this schema's declarations.
    #[must_use]
    pub fn request_info(&self) -> RequestInfo {
        RequestInfo::new(self.fields.iter().map(|f| f.info.clone()).collect())
    }

    /// Reports a declaration that cannot be enforced, such as a pattern
    /// that does not compile.
    pub fn check(&self) -> Result<(), BindError> {
        self.invalid.clone().map_or(Ok(()), Err)
    }

    /// Binds `req` into `target`, stopping at the first failing field.
    pub fn bind(&self, req: &Request, target: &mut H) -> Result<(), BindError> {
        self.run(req, Some(target))
    }

    /// Validates `req` against the schema without writing anywhere.
    pub fn validate(&self, req: &Request) -> Result<(), BindError> {
        self.run(req, None)
    }

    fn run(&self, req: &Request, mut target: Option<&mut H>) -> Result<(), BindError> {
        self.check()?;
        let mut body = BodyValues::new(req);

        for field in &self.fields {
            let info = &field.info;
            let mut values = body.lookup(info.source, &info.name)?;

            if values.iter().all(String::is_empty) {
                match &info.constraints.default {
                    Some(default) => values = vec![default.clone()],
                    None if info.required => {
                        return Err(BindError::missing(&info.name, info.source));
                    }
                    None => continue,
                }
            }

            (field.apply)(target.as_deref_mut(), &values).map_err(|failure| match failure {
                FieldFailure::Invalid(reason) => BindError::Invalid {
                    field: info.name.clone(),
                    location: info.source,
                    reason,
                },
                FieldFailure::Constraint(reason) => BindError::Constraint {
                    field: info.name.clone(),
                    location: info.source,
                    reason,
                },
            })?;
        }
        Ok(())
    }
}

fn convert<T: FromParam>(raw: &str, constraints: &Constraints) -> Result<T, FieldFailure> {
    constraints.check_raw(raw).map_err(FieldFailure::Constraint)?;
    let value = T::from_param(raw).map_err(FieldFailure::Invalid)?;
    constraints
        .check_range(value.numeric())
        .map_err(FieldFailure::Constraint)?;
    Ok(value)
}

/// Lazily decoded body values for one binding pass.
struct BodyValues<'r> {
    req: &'r Request,
    json: Option<Map<String, Value>>,
}

impl<'r> BodyValues<'r> {
    fn new(req: &'r Request) -> Self {
        Self { req, json: None }
    }

    fn lookup(&mut self, source: ParamSource, name: &str) -> Result<Vec<String>, BindError> {
        match source {
            ParamSource::Body if self.req.is_json() => {
                let object = self.json_object()?;
                Ok(object.get(name).map(json_strings).unwrap_or_default())
            }
            ParamSource::Body => Ok(self.req.body_form().get_all(name).to_vec()),
            ParamSource::Path | ParamSource::Query => Ok(self.req.form().get_all(name).to_vec()),
        }
    }

    fn json_object(&mut self) -> Result<&Map<String, Value>, BindError> {
        if self.json.is_none() {
            let body = self.req.body();
            let parsed = if body.is_empty() {
                Map::new()
            } else {
                match serde_json::from_slice::<Value>(body) {
                    Ok(Value::Object(map)) => map,
                    Ok(_) => {
                        return Err(BindError::Body {
                            reason: "expected a JSON object".to_string(),
                        })
                    }
                    Err(e) => {
                        return Err(BindError::Body {
                            reason: e.to_string(),
                        })
                    }
                }
            };
            self.json = Some(parsed);
        }
        Ok(self.json.get_or_insert_with(Map::new))
    }
}

/// Flattens a JSON value to raw parameter strings.
fn json_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(json_strings).collect(),
        other => vec![other.to_string()],
    }
}
