//! Preset selection.
//!
//! Pure domain logic - no I/O, no platform dependencies.

/// Which of the four indicator states applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetKey {
    ActiveMeetingWithCamera,
    ActiveMeetingWithoutCamera,
    NoMeetingWithCamera,
    NoMeetingWithoutCamera,
}

impl PresetKey {
    pub fn label(&self) -> &'static str {
        match self {
            PresetKey::ActiveMeetingWithCamera => "ActiveMeetingWithCamera",
            PresetKey::ActiveMeetingWithoutCamera => "ActiveMeetingWithoutCamera",
            PresetKey::NoMeetingWithCamera => "NoMeetingWithCamera",
            PresetKey::NoMeetingWithoutCamera => "NoMeetingWithoutCamera",
        }
    }
}

impl std::fmt::Display for PresetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Resolve the preset key. The microphone plays no part in the decision.
pub fn resolve_preset(meeting_active: bool, camera_in_use: bool) -> PresetKey {
    match (meeting_active, camera_in_use) {
        (true, true) => PresetKey::ActiveMeetingWithCamera,
        (true, false) => PresetKey::ActiveMeetingWithoutCamera,
        (false, true) => PresetKey::NoMeetingWithCamera,
        (false, false) => PresetKey::NoMeetingWithoutCamera,
    }
}

/// The four configured preset codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetTable {
    pub active_meeting_with_camera: i32,
    pub active_meeting_without_camera: i32,
    pub no_meeting_with_camera: i32,
    pub no_meeting_without_camera: i32,
}

impl Default for PresetTable {
    fn default() -> Self {
        Self {
            active_meeting_with_camera: 1,
            active_meeting_without_camera: 2,
            no_meeting_with_camera: 5,
            no_meeting_without_camera: 3,
        }
    }
}

impl PresetTable {
    pub fn code(&self, key: PresetKey) -> i32 {
        match key {
            PresetKey::ActiveMeetingWithCamera => self.active_meeting_with_camera,
            PresetKey::ActiveMeetingWithoutCamera => self.active_meeting_without_camera,
            PresetKey::NoMeetingWithCamera => self.no_meeting_with_camera,
            PresetKey::NoMeetingWithoutCamera => self.no_meeting_without_camera,
        }
    }

    pub fn code_for(&self, meeting_active: bool, camera_in_use: bool) -> i32 {
        self.code(resolve_preset(meeting_active, camera_in_use))
    }
}
