//! Delivery of transition events to interested observers.

use parking_lot::Mutex;
use scene_transition_types::TransitionEvent;
use std::sync::Arc;
use tracing::debug;

/// Receiver of transition events. Must not block: it is called from the
/// video and audio callbacks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TransitionEvent);
}

/// Event sink that records every event in memory.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<TransitionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().clone()
    }

    /// Remove and return the recorded events.
    pub fn drain(&self) -> Vec<TransitionEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn count(&self, matches: impl Fn(&TransitionEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| matches(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: TransitionEvent) {
        debug!("Recording event: {}", event.description());
        self.events.lock().push(event);
    }
}
