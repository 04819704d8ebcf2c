//! Request state for pipeline execution.
//!
//! This module provides:
//! - The mutable per-request context handed to every stage
//! - The set of output parts a caller asked for

mod parts;
mod request;
#[cfg(test)]
mod context_tests;

pub use parts::{SpaApiPart, SpaParts};
pub use request::SpaRequest;
