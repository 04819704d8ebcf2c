//! Event sinks for pipeline observability.
//!
//! The pipeline receives its sink explicitly; there is no process-wide
//! default.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
