//! Status-change detection and notification engine.
//!
//! Polls the device oracles on a fixed cadence, folds their answers into a
//! [`DeviceStatus`], and notifies the status endpoint whenever that status
//! differs from the last one reported.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  preset.rs   - Preset decision table (pure)                  │
//! │  state.rs    - DeviceStatus value + equality                 │
//! │  change.rs   - Last-status change detector                   │
//! │  provider.rs - DeviceOracles trait                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                        │
//! │  onair-detect - camera / mic / meeting oracles               │
//! │  onair-notify - HTTP status + control notifications          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  snapshot.rs  - one observation per cycle                    │
//! │  scheduler.rs - periodic ticks, commands, session signals    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use onair_monitor::{NullOracles, PresetTable, Scheduler, SchedulerSettings, SnapshotBuilder};
//! use std::sync::Arc;
//!
//! let builder = SnapshotBuilder::new(Arc::new(NullOracles), PresetTable::default());
//! let scheduler = Scheduler::new(builder, notifier, events, SchedulerSettings::default());
//! let (handle, task) = scheduler.spawn();
//! handle.trigger_now().await?;
//! handle.shutdown().await?;
//! ```

mod change;
mod preset;
mod provider;
mod scheduler;
mod snapshot;
mod state;

pub use change::ChangeDetector;
pub use preset::{resolve_preset, PresetKey, PresetTable};
pub use provider::{DeviceOracles, NullOracles, ProbingOracles};
pub use scheduler::{
    Command, Scheduler, SchedulerError, SchedulerHandle, SchedulerSettings, DEFAULT_POLL_INTERVAL,
};
pub use snapshot::SnapshotBuilder;
pub use state::{DeviceStatus, APP_SEPARATOR};
