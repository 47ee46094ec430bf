//! High-level router API.

use http::Method;

use crate::error::RouterResult;
use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;
use crate::RouteMatch;

/// A radix tree router holding one `T` per (method, path) pair.
///
/// # Example
///
/// ```rust
/// use vertex_router::Router;
/// use http::Method;
///
/// let mut router = Router::new();
/// router.register(Method::GET, "/users/:id", 1).unwrap();
/// router.register(Method::PUT, "/users/:id", 2).unwrap();
///
/// let m = router.match_route(&Method::PUT, "/users/9").unwrap();
/// assert_eq!(*m.value, 2);
/// ```
///
/// # Route Priority
///
/// 1. **Static segments** (`/users/me`)
/// 2. **Parameter segments** (`/users/:id`)
/// 3. **Catch-all segments** (`/files/*path`)
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers `value` for `method` requests to `path`.
    ///
    /// `path` uses `:name` for a single segment and `*name` for the
    /// remainder of the path.
    pub fn register(&mut self, method: Method, path: &str, value: T) -> RouterResult<()> {
        self.root.insert(path, method, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Matches a method and concrete path.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let (methods, params) = self.root.match_path(path)?;
        let value = methods.get(method)?;
        Some(RouteMatch::new(value, params))
    }

    /// Matches a path regardless of method.
    ///
    /// Used to tell "no such path" (404) apart from "wrong method" (405).
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.root.match_path(path)
    }

    /// Returns the methods registered for a path, empty if the path is unknown.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.match_path(path)
            .map(|(methods, _)| methods.allowed_methods())
            .unwrap_or_default()
    }

    /// Returns the number of (method, path) registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
