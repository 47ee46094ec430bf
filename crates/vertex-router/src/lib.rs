//! Radix tree router for Vertex.
//!
//! This is the URL-matching collaborator the dispatch layer registers its
//! per-route dispatch functions with. Paths are split on `/` and stored in a
//! compressed trie, so a lookup costs O(k) in the number of segments.
//!
//! # Placeholder syntax
//!
//! - `:name` matches exactly one non-empty segment and captures it as `name`
//! - `*name` matches the rest of the path (must be the last segment)
//!
//! The router is generic over the value stored per method, so the same tree
//! can hold operation names in tests and boxed endpoints in the server.
//!
//! # Example
//!
//! ```rust
//! use vertex_router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.register(Method::GET, "/users", "listUsers").unwrap();
//! router.register(Method::GET, "/users/:id", "getUser").unwrap();
//! router.register(Method::GET, "/files/*path", "serveFile").unwrap();
//!
//! let m = router.match_route(&Method::GET, "/users/123").unwrap();
//! assert_eq!(*m.value, "getUser");
//! assert_eq!(m.params.get("id"), Some("123"));
//! ```
//!
//! # Matching priority
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!              │               │
//!            "users"        "files"
//!              │               │
//!        ┌─────┴─────┐      "*path"
//!        │           │
//!     (leaf)       ":id"
//!      [GET]         │
//!                 (leaf)
//!                  [GET]
//! ```
//!
//! Static children are tried first, then the parameter child, then the
//! catch-all. A failed branch releases any parameters it captured before the
//! next branch is tried.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;

pub use error::{RouterError, RouterResult};
pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::Router;

/// A matched route: the registered value and the captured path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the matched method and path
    pub value: &'a T,
    /// Extracted path parameters
    pub params: Params,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(value: &'a T, params: Params) -> Self {
        Self { value, params }
    }
}
