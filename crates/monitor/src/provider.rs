//! Provider trait for device state.
//!
//! Abstracts the platform oracles so snapshot building stays pure and
//! testable. Implementations must never fail: failures are already folded
//! into each device's default.

use onair_detect::{
    probe, CameraActivity, MeetingActivity, MicrophoneActivity, ProbeWindow,
};

/// Combined view of the three device oracles.
pub trait DeviceOracles: Send + Sync {
    /// Conferencing apps currently in a call, in discovery order.
    fn meeting_apps(&self) -> Vec<String>;

    /// Whether the configured camera is in use.
    fn camera_in_use(&self) -> bool;

    /// Whether the default microphone is picking up sound.
    fn mic_in_use(&self) -> bool;
}

/// Oracles backed by `onair-detect` with bounded probe windows.
pub struct ProbingOracles {
    meetings: Box<dyn MeetingActivity>,
    cameras: Box<dyn CameraActivity>,
    mic: Box<dyn MicrophoneActivity>,
    camera_hardware_id: String,
    camera_window: ProbeWindow,
    mic_window: ProbeWindow,
    mic_threshold: f32,
}

impl ProbingOracles {
    pub fn new(
        meetings: Box<dyn MeetingActivity>,
        cameras: Box<dyn CameraActivity>,
        mic: Box<dyn MicrophoneActivity>,
        camera_hardware_id: impl Into<String>,
    ) -> Self {
        Self {
            meetings,
            cameras,
            mic,
            camera_hardware_id: camera_hardware_id.into(),
            camera_window: ProbeWindow::default(),
            mic_window: ProbeWindow::default(),
            mic_threshold: probe::DEFAULT_MIC_THRESHOLD,
        }
    }

    pub fn with_camera_window(mut self, window: ProbeWindow) -> Self {
        self.camera_window = window;
        self
    }

    pub fn with_mic_window(mut self, window: ProbeWindow) -> Self {
        self.mic_window = window;
        self
    }

    pub fn with_mic_threshold(mut self, threshold: f32) -> Self {
        self.mic_threshold = threshold;
        self
    }
}

impl DeviceOracles for ProbingOracles {
    fn meeting_apps(&self) -> Vec<String> {
        probe::meeting_apps(self.meetings.as_ref())
    }

    fn camera_in_use(&self) -> bool {
        probe::camera_in_use(
            self.cameras.as_ref(),
            &self.camera_hardware_id,
            self.camera_window,
        )
    }

    fn mic_in_use(&self) -> bool {
        probe::mic_in_use(self.mic.as_ref(), self.mic_threshold, self.mic_window)
    }
}

/// Null implementation reporting every device idle.
pub struct NullOracles;

impl DeviceOracles for NullOracles {
    fn meeting_apps(&self) -> Vec<String> {
        Vec::new()
    }

    fn camera_in_use(&self) -> bool {
        false
    }

    fn mic_in_use(&self) -> bool {
        false
    }
}
