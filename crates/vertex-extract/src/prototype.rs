//! Handler prototypes: where a route gets its per-request handler from.

use std::ops::Deref;
use std::sync::Arc;

use vertex_core::{Handler, Request};

use crate::error::BindError;
use crate::info::RequestInfo;
use crate::schema::Schema;

/// A handler type that declares its parameter schema.
pub trait Bind: Sized + Send + Sync + 'static {
    /// Builds the schema. Called once per route, at registration.
    fn schema() -> Schema<Self>;
}

/// The handler instance serving one request.
pub enum Instance<'a> {
    /// Freshly constructed and bound for this request.
    Fresh(Box<dyn Handler>),
    /// The route's shared instance.
    Shared(&'a dyn Handler),
}

impl Deref for Instance<'_> {
    type Target = dyn Handler;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Fresh(handler) => handler.as_ref(),
            Self::Shared(handler) => *handler,
        }
    }
}

impl std::fmt::Debug for Instance<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh(_) => f.write_str("Instance::Fresh"),
            Self::Shared(_) => f.write_str("Instance::Shared"),
        }
    }
}

/// Factory for the handler instance that serves a request.
///
/// Chosen once per route. A fresh prototype builds a default value for
/// every request and binds parameters into it. A shared prototype hands
/// every request the same instance: parameters are still validated, but
/// nothing is written into it, and concurrent requests use it at the same
/// time, so it must carry no per-request state.
pub trait Prototype: Send + Sync {
    /// The parameter schema, as documented and enforced.
    fn request_info(&self) -> RequestInfo;

    /// Reports schema declarations that cannot be enforced.
    fn check(&self) -> Result<(), BindError>;

    /// Produces the handler for `req`, failing on the first invalid field.
    fn instantiate<'a>(&'a self, req: &Request) -> Result<Instance<'a>, BindError>;

    /// Returns true if every request shares one instance.
    fn is_shared(&self) -> bool;
}

/// New, bound handler value per request.
pub struct Fresh<H> {
    schema: Schema<H>,
}

impl<H: Handler + Bind + Default> Fresh<H> {
    /// Creates the prototype, building `H`'s schema.
    #[must_use]
    pub fn new() -> Self {
        Self { schema: H::schema() }
    }
}

impl<H: Handler + Bind + Default> Default for Fresh<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handler + Bind + Default> Prototype for Fresh<H> {
    fn request_info(&self) -> RequestInfo {
        self.schema.request_info()
    }

    fn check(&self) -> Result<(), BindError> {
        self.schema.check()
    }

    fn instantiate<'a>(&'a self, req: &Request) -> Result<Instance<'a>, BindError> {
        let mut handler = H::default();
        self.schema.bind(req, &mut handler)?;
        Ok(Instance::Fresh(Box::new(handler)))
    }

    fn is_shared(&self) -> bool {
        false
    }
}

/// One handler instance shared by every request.
pub struct Shared<H> {
    handler: Arc<H>,
    schema: Schema<H>,
}

impl<H: Handler + Bind> Shared<H> {
    /// Wraps the shared instance.
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            schema: H::schema(),
        }
    }
}

impl<H: Handler + Bind> Prototype for Shared<H> {
    fn request_info(&self) -> RequestInfo {
        self.schema.request_info()
    }

    fn check(&self) -> Result<(), BindError> {
        self.schema.check()
    }

    fn instantiate<'a>(&'a self, req: &Request) -> Result<Instance<'a>, BindError> {
        self.schema.validate(req)?;
        Ok(Instance::Shared(self.handler.as_ref()))
    }

    fn is_shared(&self) -> bool {
        true
    }
}

/// A fresh-per-request prototype for `H`.
#[must_use]
pub fn fresh<H: Handler + Bind + Default>() -> Arc<dyn Prototype> {
    Arc::new(Fresh::<H>::new())
}

/// A shared prototype around `handler`.
pub fn shared<H: Handler + Bind>(handler: H) -> Arc<dyn Prototype> {
    Arc::new(Shared::new(Arc::new(handler)))
}
