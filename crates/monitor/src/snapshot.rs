use crate::preset::PresetTable;
use crate::provider::DeviceOracles;
use crate::state::DeviceStatus;
use std::sync::Arc;

/// Queries every oracle once and folds the answers into a [`DeviceStatus`].
///
/// Blocks for up to the sum of the camera and mic probe windows.
pub struct SnapshotBuilder {
    oracles: Arc<dyn DeviceOracles>,
    presets: PresetTable,
}

impl SnapshotBuilder {
    pub fn new(oracles: Arc<dyn DeviceOracles>, presets: PresetTable) -> Self {
        Self { oracles, presets }
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn build(&self) -> DeviceStatus {
        let apps = self.oracles.meeting_apps();
        let camera_in_use = self.oracles.camera_in_use();
        let mic_in_use = self.oracles.mic_in_use();

        let status = DeviceStatus::new(&apps, camera_in_use, mic_in_use, &self.presets);
        tracing::trace!(?status, "snapshot built");
        status
    }
}
