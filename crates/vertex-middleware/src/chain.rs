//! Chain composition.
//!
//! A route's chain is its API-level middleware, then its route-level
//! middleware, then the terminal handler step, in exactly that order. It is
//! assembled once at registration ([`build_chain`], [`Chain::append`]) and
//! then sealed; a [`SealedChain`] is immutable and shared by every request
//! to the route.

use std::sync::Arc;

use vertex_core::{BoxFuture, HandlerResult, Request, ResponseWriter};

use crate::middleware::{BoxedMiddleware, Next};

/// Builds a chain from `middleware`, preserving order exactly.
///
/// Returns `None` for an empty list; the caller then starts the chain from
/// its terminal step with [`Chain::new`].
#[must_use]
pub fn build_chain(middleware: Vec<BoxedMiddleware>) -> Option<Chain> {
    if middleware.is_empty() {
        None
    } else {
        Some(Chain { steps: middleware })
    }
}

/// A chain still under construction.
pub struct Chain {
    steps: Vec<BoxedMiddleware>,
}

impl Chain {
    /// A chain of a single step.
    #[must_use]
    pub fn new(step: BoxedMiddleware) -> Self {
        Self { steps: vec![step] }
    }

    /// Adds `step` at the tail. Earlier steps keep their order.
    pub fn append(&mut self, step: BoxedMiddleware) {
        self.steps.push(step);
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; a chain holds at least one step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Freezes the chain for serving.
    #[must_use]
    pub fn seal(self) -> SealedChain {
        SealedChain {
            steps: self.steps.into(),
        }
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("steps", &step_names(&self.steps))
            .finish()
    }
}

/// An immutable chain, cheap to clone and safe to run concurrently.
#[derive(Clone)]
pub struct SealedChain {
    steps: Arc<[BoxedMiddleware]>,
}

impl SealedChain {
    /// Runs the chain from its head.
    pub fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut Request,
    ) -> BoxFuture<'a, HandlerResult> {
        Next::new(&self.steps).run(w, req)
    }

    /// Step names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        step_names(&self.steps)
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; a sealed chain holds at least one step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for SealedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedChain")
            .field("steps", &self.names())
            .finish()
    }
}

fn step_names(steps: &[BoxedMiddleware]) -> Vec<&'static str> {
    steps.iter().map(|s| s.name()).collect()
}
