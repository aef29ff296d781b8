//! Device status snapshot.

use crate::preset::{resolve_preset, PresetKey, PresetTable};

/// Separator used to join meeting app names.
pub const APP_SEPARATOR: &str = ", ";

/// One observation of meeting, camera and microphone state.
///
/// Immutable once built. Equality compares `meeting_apps` case-insensitively
/// and everything else exactly; it is what drives change detection.
#[derive(Debug, Clone)]
pub struct DeviceStatus {
    meeting_active: bool,
    meeting_apps: String,
    camera_in_use: bool,
    mic_in_use: bool,
    preset_code: i32,
}

impl DeviceStatus {
    /// Build a snapshot; the preset code is derived from `presets`.
    pub fn new(
        meeting_apps: &[String],
        camera_in_use: bool,
        mic_in_use: bool,
        presets: &PresetTable,
    ) -> Self {
        let meeting_active = !meeting_apps.is_empty();
        Self {
            meeting_active,
            meeting_apps: meeting_apps.join(APP_SEPARATOR),
            camera_in_use,
            mic_in_use,
            preset_code: presets.code_for(meeting_active, camera_in_use),
        }
    }

    pub fn meeting_active(&self) -> bool {
        self.meeting_active
    }

    /// Comma-joined conferencing apps currently in a call.
    pub fn meeting_apps(&self) -> &str {
        &self.meeting_apps
    }

    pub fn camera_in_use(&self) -> bool {
        self.camera_in_use
    }

    pub fn mic_in_use(&self) -> bool {
        self.mic_in_use
    }

    pub fn preset_code(&self) -> i32 {
        self.preset_code
    }

    pub fn preset_key(&self) -> PresetKey {
        resolve_preset(self.meeting_active, self.camera_in_use)
    }

    /// Human-readable description for local display.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.meeting_active {
            parts.push(format!("On meeting: {}", self.meeting_apps));
        }
        if self.camera_in_use {
            parts.push("Camera in use".to_string());
        }
        if self.mic_in_use {
            parts.push("Microphone in use".to_string());
        }
        if parts.is_empty() {
            return "No active meeting, camera, or mic".to_string();
        }
        parts.join(", ")
    }
}

impl PartialEq for DeviceStatus {
    fn eq(&self, other: &Self) -> bool {
        self.meeting_active == other.meeting_active
            && self.camera_in_use == other.camera_in_use
            && self.mic_in_use == other.mic_in_use
            && self.preset_code == other.preset_code
            && self.meeting_apps.to_lowercase() == other.meeting_apps.to_lowercase()
    }
}

impl Eq for DeviceStatus {}
