//! Device activity oracles.
//!
//! Each oracle answers a single question about the local machine: is the
//! configured camera streaming, is the default microphone picking up sound,
//! which conferencing apps are showing a call window. Queries may block for a
//! bounded probe window and may fail; [`probe`] turns failures into the
//! per-device defaults.

mod camera;
mod error;
mod meeting;
mod mic;
pub mod probe;

pub use camera::{find_camera, CameraActivity, CameraDevice, PlatformCameras};
pub use error::{DetectError, Result};
pub use meeting::{
    process_matches, AppWindow, MeetingActivity, PlatformWindows, WindowSource,
    WindowTitleMeetings, DEFAULT_MEETING_APPS, DEFAULT_MEETING_KEYWORDS,
};
pub use mic::{CpalMicrophone, MicrophoneActivity, PeakMeter};
pub use probe::{camera_in_use, meeting_apps, mic_in_use, poll_for, ProbeWindow};
