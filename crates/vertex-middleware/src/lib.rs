//! Middleware chains for Vertex.
//!
//! Every route runs an ordered chain: the API's middleware, then the
//! route's own middleware, then a terminal step that binds parameters and
//! calls the handler. Each step is a [`Middleware`] receiving a [`Next`]
//! continuation; returning without running it short-circuits the rest.
//!
//! ```text
//!   request ─▶ api mw 1 ─▶ api mw 2 ─▶ route mw ─▶ handler step
//!   result  ◀────────────◀────────────◀──────────◀──────┘
//! ```
//!
//! Chains are built once per route ([`build_chain`], [`Chain::append`]),
//! sealed ([`Chain::seal`]) and then only read.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod error;
mod middleware;
pub mod stages;

use std::sync::Arc;

pub use chain::{build_chain, Chain, SealedChain};
pub use error::ChainError;
pub use middleware::{BoxedMiddleware, FnMiddleware, Middleware, Next};
pub use stages::{Recover, RequestIdMiddleware, RequestLogger, REQUEST_ID_HEADER};

/// The stock middleware set: request id, request logging, panic recovery.
#[must_use]
pub fn default_middleware() -> Vec<BoxedMiddleware> {
    vec![
        Arc::new(RequestIdMiddleware::new()),
        Arc::new(RequestLogger),
        Arc::new(Recover),
    ]
}
