use crate::Result;

/// A video capture device resolved from a hardware-id fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Platform identifier the hardware-id fragment is matched against.
    pub id: String,
    /// Device node or handle used to query activity.
    pub path: String,
}

impl CameraDevice {
    /// Case-insensitive substring match of `fragment` against the identifier.
    pub fn matches(&self, fragment: &str) -> bool {
        self.id.to_lowercase().contains(&fragment.to_lowercase())
    }
}

/// Oracle answering "is this camera actively streaming".
pub trait CameraActivity: Send + Sync {
    /// Resolve the first device whose identifier contains `hardware_id`.
    fn resolve(&self, hardware_id: &str) -> Result<Option<CameraDevice>>;

    /// Sample the activity signal once.
    fn is_streaming(&self, device: &CameraDevice) -> Result<bool>;
}

/// Pick the first device matching `fragment`, in enumeration order.
pub fn find_camera(devices: Vec<CameraDevice>, fragment: &str) -> Option<CameraDevice> {
    devices.into_iter().find(|d| d.matches(fragment))
}

#[cfg(target_os = "linux")]
mod linux {
    use super::{find_camera, CameraActivity, CameraDevice};
    use crate::{DetectError, Result};
    use std::path::{Path, PathBuf};

    const SYSFS_VIDEO: &str = "/sys/class/video4linux";

    /// V4L2 cameras enumerated from sysfs.
    ///
    /// The identifier mimics the USB moniker format (`VID_xxxx&PID_xxxx`) so the
    /// same hardware-id fragment works across platforms. A camera counts as
    /// streaming while another process holds its device node open.
    #[derive(Debug, Default)]
    pub struct SysfsCameras;

    impl SysfsCameras {
        pub fn new() -> Self {
            Self
        }

        fn list(&self) -> Result<Vec<CameraDevice>> {
            let mut devices = Vec::new();
            for entry in std::fs::read_dir(SYSFS_VIDEO)?.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if !name.starts_with("video") {
                    continue;
                }
                let path = format!("/dev/{name}");
                let id = match usb_ids(&entry.path()) {
                    Some((vid, pid)) => format!("{path}#VID_{vid}&PID_{pid}"),
                    None => path.clone(),
                };
                devices.push(CameraDevice { id, path });
            }
            devices.sort_by(|a, b| a.path.cmp(&b.path));
            Ok(devices)
        }
    }

    /// Walk up from the video4linux node to the USB device carrying the ids.
    fn usb_ids(node: &Path) -> Option<(String, String)> {
        let mut current: Option<PathBuf> = std::fs::canonicalize(node.join("device")).ok();
        while let Some(dir) = current {
            let vid = std::fs::read_to_string(dir.join("idVendor"));
            let pid = std::fs::read_to_string(dir.join("idProduct"));
            if let (Ok(vid), Ok(pid)) = (vid, pid) {
                return Some((vid.trim().to_uppercase(), pid.trim().to_uppercase()));
            }
            current = dir.parent().map(Path::to_path_buf);
        }
        None
    }

    fn held_open_elsewhere(dev_path: &str) -> Result<bool> {
        let own_pid = std::process::id().to_string();
        let target = Path::new(dev_path);

        for proc_entry in std::fs::read_dir("/proc")?.flatten() {
            let pid = proc_entry.file_name();
            let pid = pid.to_string_lossy();
            if !pid.chars().all(|c| c.is_ascii_digit()) || pid == own_pid {
                continue;
            }
            // Other users' fd tables are unreadable; skip them.
            let Ok(fds) = std::fs::read_dir(proc_entry.path().join("fd")) else {
                continue;
            };
            for fd in fds.flatten() {
                if std::fs::read_link(fd.path()).is_ok_and(|link| link == target) {
                    tracing::debug!(pid = %pid, device = dev_path, "camera held open");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    impl CameraActivity for SysfsCameras {
        fn resolve(&self, hardware_id: &str) -> Result<Option<CameraDevice>> {
            Ok(find_camera(self.list()?, hardware_id))
        }

        fn is_streaming(&self, device: &CameraDevice) -> Result<bool> {
            if !Path::new(&device.path).exists() {
                return Err(DetectError::DeviceNotFound(device.path.clone()));
            }
            held_open_elsewhere(&device.path)
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux::SysfsCameras as PlatformCameras;

/// Fallback that never resolves a camera, which the probing policy treats as busy.
#[cfg(not(target_os = "linux"))]
#[derive(Debug, Default)]
pub struct PlatformCameras;

#[cfg(not(target_os = "linux"))]
impl PlatformCameras {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_os = "linux"))]
impl CameraActivity for PlatformCameras {
    fn resolve(&self, _hardware_id: &str) -> Result<Option<CameraDevice>> {
        Ok(None)
    }

    fn is_streaming(&self, _device: &CameraDevice) -> Result<bool> {
        Err(crate::DetectError::Unsupported("camera activity"))
    }
}
