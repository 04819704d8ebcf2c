//! Pipeline builder with validation, and the standard group wiring.

use super::{ActionGroup, SpaPipeline};
use crate::config::{SpaConfig, TrailingSlashPolicy};
use crate::context::SpaRequest;
use crate::errors::PipelineValidationError;
use crate::events::{EventSink, NoOpEventSink};
use crate::reporter::{ErrorReporter, LoggingErrorReporter};
use crate::stages::{
    AddTrailingSlash, ContentLookup, FindDomainAndCulture, InitModels, NotFound,
    OutboundRedirects, PushToCache, ReadFromCache, RemoveTrailingSlash, SpaServices, Stage,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Builder for creating validated pipelines.
#[derive(Default)]
pub struct PipelineBuilder {
    groups: Vec<ActionGroup>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    events: Option<Arc<dyn EventSink>>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a group. Groups run in the order they are added.
    #[must_use]
    pub fn group(mut self, group: ActionGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Appends several groups.
    #[must_use]
    pub fn groups(mut self, groups: impl IntoIterator<Item = ActionGroup>) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Sets the error reporter. Defaults to a non-debug [`LoggingErrorReporter`].
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Sets the event sink. Defaults to [`NoOpEventSink`].
    #[must_use]
    pub fn event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Returns the number of groups added so far.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no groups, a group has no stages, or two
    /// groups share a name.
    pub fn build(self) -> Result<SpaPipeline, PipelineValidationError> {
        if self.groups.is_empty() {
            return Err(PipelineValidationError::new(
                "PIPELINE-EMPTY",
                "Pipeline has no action groups",
            ));
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.is_empty() {
                return Err(PipelineValidationError::new(
                    "PIPELINE-EMPTY-GROUP",
                    format!("Action group '{}' has no stages", group.name()),
                )
                .with_groups(vec![group.name().to_string()]));
            }
            if !seen.insert(group.name()) {
                return Err(PipelineValidationError::new(
                    "PIPELINE-DUPLICATE-GROUP",
                    format!("Action group '{}' is defined more than once", group.name()),
                )
                .with_groups(vec![group.name().to_string()]));
            }
        }

        Ok(SpaPipeline::new(
            self.groups,
            self.reporter
                .unwrap_or_else(|| Arc::new(LoggingErrorReporter::default())),
            self.events.unwrap_or_else(|| Arc::new(NoOpEventSink)),
        ))
    }
}

/// The standard `setup`, `build` and `finalize` groups.
///
/// `build` only runs when no data model exists yet, so a cache hit in
/// `setup` skips it.
pub fn standard_action_groups(services: &SpaServices, config: &SpaConfig) -> Vec<ActionGroup> {
    let mut setup: Vec<Arc<dyn Stage>> = Vec::new();
    match config.trailing_slash {
        TrailingSlashPolicy::Ignore => {}
        TrailingSlashPolicy::Enforce => setup.push(Arc::new(AddTrailingSlash)),
        TrailingSlashPolicy::Remove => setup.push(Arc::new(RemoveTrailingSlash)),
    }
    setup.push(Arc::new(FindDomainAndCulture::new(services.domains.clone())));
    setup.push(Arc::new(ReadFromCache::new(services.cache.clone())));

    let build: Vec<Arc<dyn Stage>> = vec![
        Arc::new(ContentLookup::new(services.content.clone())),
        Arc::new(OutboundRedirects::new(services.redirects.clone())),
        Arc::new(NotFound),
        Arc::new(InitModels::new(
            services.site_model.clone(),
            services.navigation_model.clone(),
            services.content_model.clone(),
            services.content_token.clone(),
        )),
    ];

    let finalize: Vec<Arc<dyn Stage>> = vec![Arc::new(PushToCache::new(services.cache.clone()))];

    vec![
        ActionGroup::always("setup", setup),
        ActionGroup::new("build", |request: &SpaRequest| request.data_model().is_none(), build),
        ActionGroup::always("finalize", finalize),
    ]
}

impl SpaPipeline {
    /// Builds the standard pipeline with a [`LoggingErrorReporter`] honouring
    /// `config.debug`.
    pub fn standard(
        services: &SpaServices,
        config: &SpaConfig,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, PipelineValidationError> {
        PipelineBuilder::new()
            .groups(standard_action_groups(services, config))
            .reporter(Arc::new(LoggingErrorReporter::new(config.debug)))
            .event_sink(events)
            .build()
    }
}
