//! Action groups: guarded, ordered lists of stages.

use crate::context::SpaRequest;
use crate::stages::Stage;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether a group runs for a request.
pub type Guard = Arc<dyn Fn(&SpaRequest) -> bool + Send + Sync>;

/// A named, guarded, ordered list of stages.
///
/// Groups are immutable once built and are shared between requests.
#[derive(Clone)]
pub struct ActionGroup {
    name: String,
    guard: Guard,
    stages: Vec<Arc<dyn Stage>>,
}

impl ActionGroup {
    /// Creates a group that runs only when `guard` holds.
    pub fn new<G>(name: impl Into<String>, guard: G, stages: Vec<Arc<dyn Stage>>) -> Self
    where
        G: Fn(&SpaRequest) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            guard: Arc::new(guard),
            stages,
        }
    }

    /// Creates a group that always runs.
    pub fn always(name: impl Into<String>, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self::new(name, |_: &SpaRequest| true, stages)
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the guard against the current state of `request`.
    #[must_use]
    pub fn should_run(&self, request: &SpaRequest) -> bool {
        (self.guard)(request)
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    /// Returns true if the group has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for ActionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroup")
            .field("name", &self.name)
            .field("stages", &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
