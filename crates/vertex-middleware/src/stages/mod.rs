//! Stock middleware stages.
//!
//! | Stage | Purpose |
//! |-------|---------|
//! | [`RequestIdMiddleware`] | Assigns an `x-request-id` (UUID v7) and echoes it |
//! | [`RequestLogger`] | One structured log line per request |
//! | [`Recover`] | Turns a panic downstream into an internal error |

pub mod logging;
pub mod recover;
pub mod request_id;

pub use logging::RequestLogger;
pub use recover::Recover;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
