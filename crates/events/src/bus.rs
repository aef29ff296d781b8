//! Event bus abstraction for user-facing messages.
//!
//! The monitor reports status changes, monitoring toggles and delivery
//! failures through this trait instead of talking to any display directly.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for events addressed to the user.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name/topic (e.g., "delivery:failed")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `event` and emit it on `topic`.
pub fn emit_event<T: Serialize>(bus: &dyn EventBus, topic: &str, event: &T) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(topic, payload),
        Err(e) => tracing::error!(topic, error = %e, "failed to serialize event"),
    }
}

/// Event bus that records every event, in order. Used by tests.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking test thread must not hide the events recorded so far.
    fn guard(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.guard().clone()
    }

    /// Recorded events on `topic`, oldest first.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.guard()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Topics in emission order.
    pub fn topics(&self) -> Vec<String> {
        self.guard().iter().map(|e| e.topic.clone()).collect()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.guard().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}
