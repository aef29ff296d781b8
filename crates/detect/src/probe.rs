//! Bounded-wait probing and the per-device failure policies.
//!
//! Camera: unresolved device or any query error counts as *in use*.
//! Microphone: any error counts as *not in use*.
//! Meeting apps: any error counts as *no meeting*.

use crate::{CameraActivity, MeetingActivity, MicrophoneActivity, Result};
use std::time::{Duration, Instant};

/// Default length of a camera or microphone probe.
pub const DEFAULT_PROBE_WINDOW: Duration = Duration::from_millis(2000);

/// Default sampling granularity inside a probe window.
pub const DEFAULT_PROBE_STEP: Duration = Duration::from_millis(100);

/// Default normalized peak level above which the microphone counts as active.
pub const DEFAULT_MIC_THRESHOLD: f32 = 0.01;

/// How long to watch for an activity signal and how often to sample it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeWindow {
    pub timeout: Duration,
    pub step: Duration,
}

impl Default for ProbeWindow {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_WINDOW,
            step: DEFAULT_PROBE_STEP,
        }
    }
}

/// Sample `probe` every `window.step` until it reports a signal or the window
/// elapses. The first sample is taken immediately.
pub fn poll_for<F>(window: ProbeWindow, mut probe: F) -> Result<bool>
where
    F: FnMut() -> Result<bool>,
{
    let start = Instant::now();
    loop {
        if probe()? {
            return Ok(true);
        }
        let elapsed = start.elapsed();
        if elapsed >= window.timeout {
            return Ok(false);
        }
        std::thread::sleep(window.step.min(window.timeout - elapsed));
    }
}

/// Whether the camera matching `hardware_id` is in use. Fails closed.
pub fn camera_in_use(cameras: &dyn CameraActivity, hardware_id: &str, window: ProbeWindow) -> bool {
    let device = match cameras.resolve(hardware_id) {
        Ok(Some(device)) => device,
        Ok(None) => {
            tracing::debug!(hardware_id, "camera not found, assuming in use");
            return true;
        }
        Err(e) => {
            tracing::warn!(hardware_id, error = %e, "camera lookup failed, assuming in use");
            return true;
        }
    };

    match poll_for(window, || cameras.is_streaming(&device)) {
        Ok(active) => active,
        Err(e) => {
            tracing::warn!(device = %device.id, error = %e, "camera probe failed, assuming in use");
            true
        }
    }
}

/// Whether the default microphone peaks above `threshold` within the window. Fails open.
pub fn mic_in_use(mic: &dyn MicrophoneActivity, threshold: f32, window: ProbeWindow) -> bool {
    let result = mic
        .open_meter()
        .and_then(|mut meter| poll_for(window, || Ok(meter.peak()? > threshold)));

    match result {
        Ok(active) => active,
        Err(e) => {
            tracing::debug!(error = %e, "mic probe failed, assuming idle");
            false
        }
    }
}

/// Recognised conferencing apps currently in a call. Errors yield an empty list.
pub fn meeting_apps(meetings: &dyn MeetingActivity) -> Vec<String> {
    meetings.active_meeting_apps().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "meeting detection failed, assuming none");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraDevice, DetectError, PeakMeter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn quick() -> ProbeWindow {
        ProbeWindow {
            timeout: Duration::from_millis(50),
            step: Duration::from_millis(10),
        }
    }

    struct FakeCamera {
        device: Option<CameraDevice>,
        signal: std::result::Result<bool, &'static str>,
        probes: AtomicUsize,
    }

    impl FakeCamera {
        fn new(found: bool, signal: std::result::Result<bool, &'static str>) -> Self {
            Self {
                device: found.then(|| CameraDevice {
                    id: "/dev/video0#VID_5986&PID_2113".to_string(),
                    path: "/dev/video0".to_string(),
                }),
                signal,
                probes: AtomicUsize::new(0),
            }
        }
    }

    impl CameraActivity for FakeCamera {
        fn resolve(&self, hardware_id: &str) -> Result<Option<CameraDevice>> {
            Ok(self.device.clone().filter(|d| d.matches(hardware_id)))
        }

        fn is_streaming(&self, _device: &CameraDevice) -> Result<bool> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.signal.map_err(|e| DetectError::Query(e.to_string()))
        }
    }

    struct ScriptedMeter(Mutex<Vec<f32>>);

    impl PeakMeter for &ScriptedMeter {
        fn peak(&mut self) -> Result<f32> {
            Ok(self.0.lock().unwrap().pop().unwrap_or(0.0))
        }
    }

    impl MicrophoneActivity for ScriptedMeter {
        fn open_meter(&self) -> Result<Box<dyn PeakMeter + '_>> {
            Ok(Box::new(self))
        }
    }

    struct BrokenMic;

    impl MicrophoneActivity for BrokenMic {
        fn open_meter(&self) -> Result<Box<dyn PeakMeter + '_>> {
            Err(DetectError::DeviceNotFound("default input".to_string()))
        }
    }

    struct BrokenMeetings;

    impl MeetingActivity for BrokenMeetings {
        fn active_meeting_apps(&self) -> Result<Vec<String>> {
            Err(DetectError::Unsupported("window listing"))
        }
    }

    #[test]
    fn test_poll_for_times_out_without_signal() {
        let calls = AtomicUsize::new(0);
        let start = Instant::now();
        let active = poll_for(quick(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        })
        .unwrap();

        assert!(!active);
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_poll_for_stops_on_first_signal() {
        let calls = AtomicUsize::new(0);
        let active = poll_for(quick(), || Ok(calls.fetch_add(1, Ordering::SeqCst) == 2)).unwrap();

        assert!(active);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unresolved_camera_is_in_use() {
        let camera = FakeCamera::new(false, Ok(false));
        assert!(camera_in_use(&camera, "VID_5986&PID_2113", quick()));
        assert_eq!(camera.probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_camera_with_different_hardware_id_is_in_use() {
        let camera = FakeCamera::new(true, Ok(false));
        assert!(camera_in_use(&camera, "VID_046D&PID_0825", quick()));
    }

    #[test]
    fn test_idle_camera_is_not_in_use() {
        let camera = FakeCamera::new(true, Ok(false));
        assert!(!camera_in_use(&camera, "vid_5986&pid_2113", quick()));
        assert!(camera.probes.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_streaming_camera_is_in_use() {
        let camera = FakeCamera::new(true, Ok(true));
        assert!(camera_in_use(&camera, "VID_5986", quick()));
        assert_eq!(camera.probes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_camera_probe_error_is_in_use() {
        let camera = FakeCamera::new(true, Err("device busy"));
        assert!(camera_in_use(&camera, "VID_5986", quick()));
    }

    #[test]
    fn test_mic_above_threshold_is_in_use() {
        // popped from the back
        let mic = ScriptedMeter(Mutex::new(vec![0.2, 0.005, 0.0]));
        assert!(mic_in_use(&mic, DEFAULT_MIC_THRESHOLD, quick()));
    }

    #[test]
    fn test_mic_at_threshold_is_not_in_use() {
        let mic = ScriptedMeter(Mutex::new(vec![0.01, 0.01]));
        assert!(!mic_in_use(&mic, DEFAULT_MIC_THRESHOLD, quick()));
    }

    #[test]
    fn test_mic_error_is_not_in_use() {
        assert!(!mic_in_use(&BrokenMic, DEFAULT_MIC_THRESHOLD, quick()));
    }

    #[test]
    fn test_meeting_error_yields_no_apps() {
        assert!(meeting_apps(&BrokenMeetings).is_empty());
    }
}
