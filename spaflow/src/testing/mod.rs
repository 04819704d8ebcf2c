//! Testing utilities for spaflow pipelines.
//!
//! This module provides:
//! - Mock stages (spy, failing, panicking, responding)
//! - An in-memory site with static resolvers and deterministic model builders

mod fixtures;
mod mocks;

pub use fixtures::{
    StaticContentResolver, StaticDomainResolver, StaticRedirectLookup, TestSite, TEST_HOST,
};
pub use mocks::{FailingStage, PanickingStage, RespondingStage, SpyStage};
