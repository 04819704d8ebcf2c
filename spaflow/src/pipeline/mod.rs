//! Pipeline building and execution.
//!
//! This module provides:
//! - Action groups (guarded stage lists)
//! - The sequential run loop with short-circuiting
//! - A validating builder and the standard group wiring

mod builder;
mod engine;
mod group;


pub use builder::{standard_action_groups, PipelineBuilder};
pub use engine::SpaPipeline;
pub use group::{ActionGroup, Guard};
