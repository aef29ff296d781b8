//! Scheduler - the single task that owns monitor state.
//!
//! Periodic ticks and user commands are processed strictly one at a time, so
//! at most one evaluation cycle is ever in flight. Ticks that come due while
//! a cycle is running are skipped, not queued.

use crate::change::ChangeDetector;
use crate::snapshot::SnapshotBuilder;
use crate::state::DeviceStatus;
use onair_events::{
    emit_event, event_names, now_ms, Channel, DeliveryFailedEvent, EventBusRef, MonitoringEvent,
    StatusChangedEvent,
};
use onair_notify::{Notifier, NotifyError, SessionFlag};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default time between periodic checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const COMMAND_QUEUE: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler is no longer running")]
    Closed,
}

/// Requests processed by the scheduler task.
#[derive(Debug)]
pub enum Command {
    /// Resume periodic checks.
    Start,
    /// Pause periodic checks. An in-flight cycle still completes.
    Stop,
    /// Run one cycle now, whether or not monitoring is active.
    TriggerNow,
    /// Send the session-end signal and exit; acknowledged once it has been sent.
    Shutdown(oneshot::Sender<()>),
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    pub interval: Duration,
    /// Begin with periodic checks paused.
    pub start_paused: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            start_paused: false,
        }
    }
}

/// Cloneable sender side used by the control surface.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Command>,
}

impl SchedulerHandle {
    async fn send(&self, command: Command) -> Result<(), SchedulerError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| SchedulerError::Closed)
    }

    pub async fn start(&self) -> Result<(), SchedulerError> {
        self.send(Command::Start).await
    }

    pub async fn stop(&self) -> Result<(), SchedulerError> {
        self.send(Command::Stop).await
    }

    pub async fn trigger_now(&self) -> Result<(), SchedulerError> {
        self.send(Command::TriggerNow).await
    }

    /// Ask the scheduler to exit and wait until the session-end signal has
    /// been attempted.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Command::Shutdown(ack_tx)).await?;
        ack_rx.await.map_err(|_| SchedulerError::Closed)
    }
}

/// Drives snapshot, change detection and notification on a fixed cadence.
pub struct Scheduler {
    builder: Arc<SnapshotBuilder>,
    notifier: Arc<dyn Notifier>,
    events: EventBusRef,
    detector: ChangeDetector,
    monitoring_active: bool,
    interval: Duration,
}

impl Scheduler {
    pub fn new(
        builder: SnapshotBuilder,
        notifier: Arc<dyn Notifier>,
        events: EventBusRef,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            builder: Arc::new(builder),
            notifier,
            events,
            detector: ChangeDetector::new(),
            monitoring_active: !settings.start_paused,
            // tokio's interval rejects a zero period
            interval: settings.interval.max(Duration::from_millis(1)),
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring_active
    }

    pub fn last_status(&self) -> Option<&DeviceStatus> {
        self.detector.last()
    }

    /// Spawn the scheduler task on the current tokio runtime.
    ///
    /// The session-start signal is sent before the first periodic tick.
    pub fn spawn(self) -> (SchedulerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let task = tokio::spawn(self.run(rx));
        (SchedulerHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        tracing::info!(interval = ?self.interval, active = self.monitoring_active, "scheduler started");
        self.send_control(SessionFlag::Start).await;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                command = rx.recv() => match command {
                    Some(Command::Start) => {
                        if self.start() {
                            ticker.reset();
                        }
                    }
                    Some(Command::Stop) => {
                        self.stop();
                    }
                    Some(Command::TriggerNow) => {
                        self.run_cycle().await;
                    }
                    Some(Command::Shutdown(ack)) => {
                        self.send_control(SessionFlag::End).await;
                        let _ = ack.send(());
                        break;
                    }
                    None => {
                        // Every handle dropped: the process is going away.
                        self.send_control(SessionFlag::End).await;
                        break;
                    }
                },

                _ = ticker.tick(), if self.monitoring_active => {
                    self.run_cycle().await;
                }
            }
        }

        tracing::info!("scheduler stopped");
    }

    /// Resume periodic checks. Returns false if already active.
    pub fn start(&mut self) -> bool {
        if self.monitoring_active {
            return false;
        }
        self.monitoring_active = true;
        tracing::info!("monitoring started");
        emit_event(
            self.events.as_ref(),
            event_names::MONITORING_STARTED,
            &MonitoringEvent {
                active: true,
                message: "Monitoring has resumed.".to_string(),
            },
        );
        true
    }

    /// Pause periodic checks. Returns false if already paused.
    pub fn stop(&mut self) -> bool {
        if !self.monitoring_active {
            return false;
        }
        self.monitoring_active = false;
        tracing::info!("monitoring stopped");
        emit_event(
            self.events.as_ref(),
            event_names::MONITORING_STOPPED,
            &MonitoringEvent {
                active: false,
                message: "Monitoring has been paused.".to_string(),
            },
        );
        true
    }

    /// Run one evaluation cycle. Returns the new status if it was a change.
    ///
    /// The status is recorded as the last one before sending, and stays
    /// recorded even if delivery fails.
    pub async fn run_cycle(&mut self) -> Option<DeviceStatus> {
        let builder = Arc::clone(&self.builder);
        let status = match tokio::task::spawn_blocking(move || builder.build()).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(error = %e, "snapshot task failed");
                return None;
            }
        };

        let Some(changed) = self.detector.observe(status).cloned() else {
            tracing::trace!("status unchanged");
            return None;
        };

        tracing::info!(
            preset = changed.preset_code(),
            key = %changed.preset_key(),
            meeting_apps = changed.meeting_apps(),
            camera = changed.camera_in_use(),
            mic = changed.mic_in_use(),
            "status changed"
        );

        if let Err(e) = self.notifier.notify_status(changed.preset_code()).await {
            self.report_failure(Channel::Status, &e);
        }

        emit_event(
            self.events.as_ref(),
            event_names::STATUS_CHANGED,
            &StatusChangedEvent {
                preset_code: changed.preset_code(),
                summary: changed.summary(),
                meeting_apps: changed.meeting_apps().to_string(),
                camera_in_use: changed.camera_in_use(),
                mic_in_use: changed.mic_in_use(),
                timestamp_ms: now_ms(),
            },
        );

        Some(changed)
    }

    async fn send_control(&self, flag: SessionFlag) {
        tracing::info!(?flag, "sending session signal");
        if let Err(e) = self.notifier.notify_control(flag).await {
            self.report_failure(Channel::Control, &e);
        }
    }

    fn report_failure(&self, channel: Channel, error: &NotifyError) {
        tracing::warn!(%channel, error = %error, "notification failed");
        emit_event(
            self.events.as_ref(),
            event_names::DELIVERY_FAILED,
            &DeliveryFailedEvent {
                channel,
                error: error.to_string(),
            },
        );
    }
}
