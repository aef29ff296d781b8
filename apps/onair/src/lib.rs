mod control;
mod event_log;

use anyhow::Context;
use clap::Parser;
use onair_config::Config;
use onair_detect::{CpalMicrophone, PlatformCameras, PlatformWindows, ProbeWindow, WindowTitleMeetings};
use onair_monitor::{PresetTable, ProbingOracles, Scheduler, SchedulerSettings, SnapshotBuilder};
use onair_notify::HttpNotifier;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub use control::{ControlCommand, UnknownCommand};
pub use event_log::TracingEventBus;

#[derive(Debug, Parser)]
#[command(name = "onair", version, about = "Keep an on-air light in sync with camera, mic and meetings")]
pub struct Cli {
    /// Config file (defaults to $ONAIR_CONFIG, then the per-user config dir)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Start with periodic checks paused
    #[arg(long)]
    pub paused: bool,
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,onair=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    tracing::info!(
        post_url = %config.post_url,
        get_url = %config.get_url,
        camera = %config.camera_hardware_id,
        "starting onair monitor"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let result = runtime.block_on(monitor(config, cli.paused));
    // The stdin reader sits on a blocking thread that never returns by itself.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn monitor(config: Config, paused: bool) -> anyhow::Result<()> {
    let scheduler = build_scheduler(&config, paused)?;
    let (handle, task) = scheduler.spawn();

    control::run(handle).await?;
    task.await.context("scheduler task panicked")?;

    tracing::info!("onair monitor stopped");
    Ok(())
}

fn build_scheduler(config: &Config, paused: bool) -> anyhow::Result<Scheduler> {
    let step = config.probe_step();
    let meetings = WindowTitleMeetings::with_targets(
        PlatformWindows::new(),
        config.meeting_apps.clone(),
        config.meeting_keywords.clone(),
    );
    let oracles = ProbingOracles::new(
        Box::new(meetings),
        Box::new(PlatformCameras::new()),
        Box::new(CpalMicrophone::new()),
        config.camera_hardware_id.clone(),
    )
    .with_camera_window(ProbeWindow {
        timeout: config.camera_probe(),
        step,
    })
    .with_mic_window(ProbeWindow {
        timeout: config.mic_probe(),
        step,
    })
    .with_mic_threshold(config.mic_threshold);

    let presets = PresetTable {
        active_meeting_with_camera: config.active_meeting_with_camera_preset,
        active_meeting_without_camera: config.active_meeting_without_camera_preset,
        no_meeting_with_camera: config.no_meeting_with_camera_preset,
        no_meeting_without_camera: config.no_meeting_without_camera_preset,
    };

    let notifier = HttpNotifier::with_timeout(
        config.post_url.clone(),
        config.get_url.clone(),
        config.request_timeout(),
    )
    .context("failed to build HTTP client")?;

    Ok(Scheduler::new(
        SnapshotBuilder::new(Arc::new(oracles), presets),
        Arc::new(notifier),
        Arc::new(TracingEventBus),
        SchedulerSettings {
            interval: config.poll_interval(),
            start_paused: paused,
        },
    ))
}
