//! # Spaflow
//!
//! A staged request pipeline that serves page data to single-page
//! application frontends.
//!
//! A request runs through ordered action groups of stages:
//!
//! - **Guarded groups**: each group runs only when its guard holds for the
//!   current request state
//! - **Short-circuiting**: a stage that sets a terminal response (redirect,
//!   not found) ends the run immediately
//! - **Read-through cache**: a cached page model skips the build group
//! - **Failure provenance**: stage failures surface as [`PipelineError`]
//!   naming the group and stage, with the original cause intact
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spaflow::prelude::*;
//!
//! let handler = SpaHandler::standard(&services, SpaConfig::default(), Arc::new(NoOpEventSink))?;
//!
//! let inbound = InboundRequest::new("example.com").with_query("url", "/about/");
//! let response = handler.handle(&inbound).await?;
//! ```
//!
//! [`PipelineError`]: errors::PipelineError

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cache;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod meta;
pub mod observability;
pub mod pipeline;
pub mod preview;
pub mod reporter;
pub mod stages;
pub mod testing;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::{CacheKey, CachedPage, InMemoryPageCache, PageCache};
    pub use crate::config::{LogFormat, LoggingConfig, SpaConfig, TrailingSlashPolicy};
    pub use crate::context::{SpaApiPart, SpaParts, SpaRequest};
    pub use crate::core::{
        ContentNode, DomainMatch, RedirectTarget, ResponseBody, SpaDataModel, SpaResponse,
    };
    pub use crate::errors::{
        ConfigError, ContextError, PipelineError, PipelineValidationError, StagePanic,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::meta::{OpenGraphProperties, SpaMetaData, TwitterSummaryCard};
    pub use crate::pipeline::{standard_action_groups, ActionGroup, PipelineBuilder, SpaPipeline};
    pub use crate::reporter::{ErrorReporter, LoggingErrorReporter};
    pub use crate::stages::{
        ContentResolver, ContentToken, DomainResolver, ModelBuilder, RedirectLookup, SpaServices,
        Stage,
    };
    pub use crate::transport::{InboundRequest, OutboundResponse, SpaHandler};
}
