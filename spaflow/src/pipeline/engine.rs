//! Sequential execution of action groups.

use super::ActionGroup;
use crate::context::SpaRequest;
use crate::core::SpaResponse;
use crate::errors::{PipelineError, StagePanic};
use crate::events::EventSink;
use crate::reporter::ErrorReporter;
use crate::stages::Stage;
use futures::FutureExt;
use serde_json::json;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// A configured pipeline. Shared read-only between concurrent runs.
#[derive(Clone)]
pub struct SpaPipeline {
    groups: Vec<ActionGroup>,
    reporter: Arc<dyn ErrorReporter>,
    events: Arc<dyn EventSink>,
}

impl SpaPipeline {
    pub(crate) fn new(
        groups: Vec<ActionGroup>,
        reporter: Arc<dyn ErrorReporter>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            groups,
            reporter,
            events,
        }
    }

    /// Returns the action groups in execution order.
    #[must_use]
    pub fn groups(&self) -> &[ActionGroup] {
        &self.groups
    }

    /// Runs the pipeline for `request`.
    ///
    /// Groups run in order; a group whose guard is false is skipped. Once a
    /// stage sets a terminal response nothing else runs, not even later
    /// guards. Without a terminal response, a built data model becomes a
    /// 200 response stamped with the execution time, and a run that produced
    /// neither ends in a generic 500.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when a stage fails or panics and the error
    /// reporter does not turn the failure into a response.
    pub async fn run(&self, request: &mut SpaRequest) -> Result<SpaResponse, PipelineError> {
        request.mark_started();
        self.events.try_emit(
            "pipeline.started",
            Some(json!({ "url": request.url(), "preview": request.is_preview() })),
        );

        match self.run_groups(request).await {
            Ok(()) => Ok(self.finish(request)),
            Err(error) => match self.reporter.handle(request, &error) {
                Some(response) => Ok(response),
                None => Err(error),
            },
        }
    }

    async fn run_groups(&self, request: &mut SpaRequest) -> Result<(), PipelineError> {
        for group in &self.groups {
            if request.has_response() {
                break;
            }
            if !group.should_run(request) {
                debug!(group = group.name(), "Skipping action group");
                self.events
                    .try_emit("group.skipped", Some(json!({ "group": group.name() })));
                continue;
            }

            for stage in group.stages() {
                self.run_stage(group, stage, request).await?;
                if request.has_response() {
                    self.events.try_emit(
                        "pipeline.short_circuited",
                        Some(json!({ "group": group.name(), "stage": stage.name() })),
                    );
                    break;
                }
            }
        }
        Ok(())
    }

    async fn run_stage(
        &self,
        group: &ActionGroup,
        stage: &Arc<dyn Stage>,
        request: &mut SpaRequest,
    ) -> Result<(), PipelineError> {
        self.events.try_emit(
            "stage.started",
            Some(json!({ "group": group.name(), "stage": stage.name() })),
        );
        let started = Instant::now();

        let result = match AssertUnwindSafe(stage.execute(request)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(anyhow::Error::new(StagePanic::from_payload(&*payload))),
        };
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(()) => {
                debug!(group = group.name(), stage = stage.name(), duration_ms, "Stage completed");
                self.events.try_emit(
                    "stage.completed",
                    Some(json!({
                        "group": group.name(),
                        "stage": stage.name(),
                        "duration_ms": duration_ms,
                    })),
                );
                Ok(())
            }
            Err(cause) => {
                self.events.try_emit(
                    "stage.failed",
                    Some(json!({
                        "group": group.name(),
                        "stage": stage.name(),
                        "error": cause.to_string(),
                        "duration_ms": duration_ms,
                    })),
                );
                Err(PipelineError::new(group.name(), stage.name(), cause))
            }
        }
    }

    fn finish(&self, request: &SpaRequest) -> SpaResponse {
        let response = if let Some(response) = request.response() {
            response.clone()
        } else if let Some(model) = request.data_model() {
            SpaResponse::ok(model.with_execute_time(request.elapsed_ms()))
        } else {
            warn!(url = %request.url(), "Pipeline finished without a response or a data model");
            SpaResponse::error("No response was produced")
        };

        self.events.try_emit(
            "pipeline.completed",
            Some(json!({
                "status": response.status().as_u16(),
                "duration_ms": request.elapsed_ms(),
            })),
        );
        response
    }
}

impl fmt::Debug for SpaPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaPipeline")
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CollectingEventSink, NoOpEventSink};
    use crate::reporter::LoggingErrorReporter;
    use crate::stages::{FnStage, NoOpStage};

    fn pipeline(groups: Vec<ActionGroup>, events: Arc<dyn EventSink>) -> SpaPipeline {
        SpaPipeline::new(groups, Arc::new(LoggingErrorReporter::default()), events)
    }

    #[tokio::test]
    async fn test_empty_run_falls_back_to_500() {
        let pipeline = pipeline(
            vec![ActionGroup::always("setup", vec![Arc::new(NoOpStage::new("noop"))])],
            Arc::new(NoOpEventSink),
        );

        let response = pipeline.run(&mut SpaRequest::new("/")).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_skipped_group_emits_event() {
        let events = Arc::new(CollectingEventSink::new());
        let pipeline = pipeline(
            vec![
                ActionGroup::new("never", |_: &SpaRequest| false, vec![Arc::new(NoOpStage::new("a"))]),
                ActionGroup::always("setup", vec![Arc::new(NoOpStage::new("b"))]),
            ],
            events.clone(),
        );

        pipeline.run(&mut SpaRequest::new("/")).await.unwrap();

        assert_eq!(events.started_stages(), vec!["b"]);
        assert_eq!(events.events_of_type("group.skipped").len(), 1);
        assert_eq!(events.events_of_type("pipeline.completed").len(), 1);
    }

    #[tokio::test]
    async fn test_panic_becomes_pipeline_error() {
        let pipeline = pipeline(
            vec![ActionGroup::always(
                "build",
                vec![Arc::new(FnStage::new("explode", |_: &mut SpaRequest| -> anyhow::Result<()> {
                    panic!("kaboom")
                }))],
            )],
            Arc::new(NoOpEventSink),
        );

        let err = pipeline.run(&mut SpaRequest::new("/")).await.unwrap_err();
        assert_eq!(err.group, "build");
        assert_eq!(err.stage, "explode");
        assert_eq!(err.cause.downcast_ref::<StagePanic>().unwrap().message, "kaboom");
    }
}
