//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and request deadlines.

pub mod deadline;
pub mod trace;

pub use deadline::{DEFAULT_REQUEST_TIMEOUT, Deadline};
pub use trace::Trace;
