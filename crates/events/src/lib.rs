//! Shared event contracts for user-facing notifications.
//!
//! These DTOs are what the monitor reports to whatever surface shows
//! messages to the user (log output, desktop notifications, a tray).
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus};

use serde::{Deserialize, Serialize};

/// Outbound endpoint a notification was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// `POST` of the preset code.
    Status,
    /// `GET` session start/end signal.
    Control,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Status => write!(f, "status"),
            Channel::Control => write!(f, "control"),
        }
    }
}

/// Event emitted when a new status snapshot differs from the last one.
///
/// Producers: monitor scheduler
/// Consumers: user notification surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    /// Preset code sent to the status endpoint.
    pub preset_code: i32,
    /// Human-readable summary of the observed state.
    pub summary: String,
    /// Comma-joined conferencing apps in a call.
    #[serde(default)]
    pub meeting_apps: String,
    #[serde(default)]
    pub camera_in_use: bool,
    #[serde(default)]
    pub mic_in_use: bool,
    /// Timestamp in milliseconds since epoch.
    #[serde(default)]
    pub timestamp_ms: i64,
}

/// Event emitted when an outbound notification fails.
///
/// Producers: monitor scheduler
/// Consumers: user notification surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryFailedEvent {
    pub channel: Channel,
    /// Error message.
    pub error: String,
}

/// Event emitted when periodic monitoring is paused or resumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringEvent {
    pub active: bool,
    pub message: String,
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Status changed and was sent.
    pub const STATUS_CHANGED: &str = "status:changed";
    /// A status or control notification failed.
    pub const DELIVERY_FAILED: &str = "delivery:failed";
    /// Periodic monitoring resumed.
    pub const MONITORING_STARTED: &str = "monitoring:started";
    /// Periodic monitoring paused.
    pub const MONITORING_STOPPED: &str = "monitoring:stopped";
}
