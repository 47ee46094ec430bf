//! # Vertex Extract
//!
//! Declarative parameter binding for Vertex handlers.
//!
//! A handler type implements [`Bind`] by returning a [`Schema`]: a list of
//! [`Param`] declarations (name, source, required flag, constraints, docs),
//! each paired with a typed setter. At registration time the schema is
//! turned into the route's [`RequestInfo`]; at request time the binder
//! reads each declared field from the merged request values (or the JSON
//! body), converts it through [`FromParam`], checks its constraints and
//! writes it into a fresh handler instance. The first failing field stops
//! binding with a [`BindError`].
//!
//! | Source | Read from |
//! |--------|-----------|
//! | [`ParamSource::Path`] | router path parameters (merged into the form) |
//! | [`ParamSource::Query`] | query string and urlencoded body |
//! | [`ParamSource::Body`] | JSON object body, else urlencoded body |
//!
//! [`Prototype`] decides whether each request gets a new bound instance
//! ([`fresh`]) or one shared instance ([`shared`]).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod convert;
mod error;
mod info;
mod prototype;
mod schema;

pub use convert::FromParam;
pub use error::BindError;
pub use info::{Constraints, ParamInfo, ParamKind, ParamSource, RequestInfo};
pub use prototype::{fresh, shared, Bind, Fresh, Instance, Prototype, Shared};
pub use schema::{Param, Schema};
