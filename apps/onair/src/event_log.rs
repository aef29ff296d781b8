use onair_events::{event_names, EventBus};
use serde_json::Value;

/// Event bus that surfaces user-facing events through the log.
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn emit(&self, topic: &str, payload: Value) {
        let text = |key: &str| payload.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

        match topic {
            event_names::STATUS_CHANGED => {
                let preset = payload.get("preset_code").and_then(Value::as_i64);
                tracing::info!(title = "Status Change", ?preset, "{}", text("summary"));
            }
            event_names::DELIVERY_FAILED => {
                tracing::warn!(title = "HTTP Error", channel = %text("channel"), "{}", text("error"));
            }
            event_names::MONITORING_STARTED => {
                tracing::info!(title = "Monitoring Started", "{}", text("message"));
            }
            event_names::MONITORING_STOPPED => {
                tracing::info!(title = "Monitoring Stopped", "{}", text("message"));
            }
            other => tracing::debug!(topic = other, %payload, "event"),
        }
    }
}
