use crate::state::DeviceStatus;

/// Remembers the last reported snapshot and decides whether a new one is a change.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<DeviceStatus>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `next` if it differs from the last reported snapshot.
    ///
    /// Returns the stored snapshot when it is a change (always on the first
    /// observation), `None` when it equals the last one.
    pub fn observe(&mut self, next: DeviceStatus) -> Option<&DeviceStatus> {
        if self.last.as_ref() == Some(&next) {
            return None;
        }
        self.last = Some(next);
        self.last.as_ref()
    }

    pub fn last(&self) -> Option<&DeviceStatus> {
        self.last.as_ref()
    }
}
