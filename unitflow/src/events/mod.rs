//! Lifecycle events for unit and context execution.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static DEFAULT_SINK: Lazy<RwLock<Arc<dyn EventSink>>> =
    Lazy::new(|| RwLock::new(Arc::new(NoOpEventSink)));

/// Returns the process-wide default event sink.
///
/// New contexts pick this up at build time; a context built before a call
/// to [`set_event_sink`] keeps the sink it was built with.
#[must_use]
pub fn get_event_sink() -> Arc<dyn EventSink> {
    DEFAULT_SINK.read().clone()
}

/// Replaces the process-wide default event sink.
pub fn set_event_sink(sink: Arc<dyn EventSink>) {
    *DEFAULT_SINK.write() = sink;
}
