#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in shdeps
//!
//! Package and version units never print. They emit severity-tagged events
//! into per-unit channels, and the [`LogAggregator`] renders them in a
//! deterministic order according to the configured threshold. Every event is
//! also forwarded to `tracing`.

pub mod aggregator;
pub mod events;
pub mod meta;

pub use aggregator::{LogAggregator, LogSink, MemorySink};
pub use events::{AppEvent, BuildEvent, FailureContext, PackageEvent, VersionEvent};
pub use meta::{EventMeta, EventSource};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event together with its metadata
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event, deriving level, source and correlation id from it
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let mut meta = EventMeta::new(event.severity(), event.event_source());
        if let Some(id) = event.correlation_id() {
            meta = meta.with_correlation_id(id);
        }
        Self { meta, event }
    }
}

/// Type alias for event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Works the same whether you hold a raw `EventSender` or a struct that
/// contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Hook for adding context to metadata before emission
    fn enrich_event_meta(&self, _event: &AppEvent, _meta: &mut EventMeta) {}

    /// Emit an event with pre-built metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let EventMessage { mut meta, event } = EventMessage::from_event(event);
        self.enrich_event_meta(&event, &mut meta);
        self.emit_with_meta(meta, event);
    }

    fn emit_build(&self, event: BuildEvent) {
        self.emit(AppEvent::Build(event));
    }

    fn emit_package(&self, event: PackageEvent) {
        self.emit(AppEvent::Package(event));
    }

    fn emit_version(&self, event: VersionEvent) {
        self.emit(AppEvent::Version(event));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
