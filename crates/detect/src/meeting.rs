use crate::Result;

/// A top-level window and the name of the process that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppWindow {
    pub process_name: String,
    pub title: String,
}

/// Lists the visible top-level windows on the desktop.
pub trait WindowSource: Send + Sync {
    fn windows(&self) -> Result<Vec<AppWindow>>;
}

/// Oracle returning the conferencing apps currently showing a call window.
pub trait MeetingActivity: Send + Sync {
    /// Recognised app names, in discovery order, without duplicates.
    fn active_meeting_apps(&self) -> Result<Vec<String>>;
}

/// Conferencing apps watched by default.
pub const DEFAULT_MEETING_APPS: &[&str] = &["Teams", "Zoom"];

/// Window-title keywords marking an active call.
pub const DEFAULT_MEETING_KEYWORDS: &[&str] = &["Meeting", "Call"];

/// Matches window titles of known conferencing processes against call keywords.
pub struct WindowTitleMeetings<W> {
    source: W,
    apps: Vec<String>,
    keywords: Vec<String>,
}

impl<W: WindowSource> WindowTitleMeetings<W> {
    pub fn new(source: W) -> Self {
        Self::with_targets(
            source,
            DEFAULT_MEETING_APPS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_MEETING_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_targets(source: W, apps: Vec<String>, keywords: Vec<String>) -> Self {
        Self {
            source,
            apps,
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn is_call_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.keywords.iter().any(|k| title.contains(k.as_str()))
    }
}

impl<W: WindowSource> MeetingActivity for WindowTitleMeetings<W> {
    fn active_meeting_apps(&self) -> Result<Vec<String>> {
        let windows = self.source.windows()?;

        let active = self
            .apps
            .iter()
            .filter(|app| {
                windows.iter().any(|w| {
                    process_matches(&w.process_name, app)
                        && !w.title.is_empty()
                        && self.is_call_title(&w.title)
                })
            })
            .cloned()
            .collect();

        Ok(active)
    }
}

/// Compare a process name with a target app, ignoring case and a `.exe` suffix.
pub fn process_matches(process_name: &str, app: &str) -> bool {
    let name = process_name.trim();
    let name = name
        .strip_suffix(".exe")
        .or_else(|| name.strip_suffix(".EXE"))
        .unwrap_or(name);
    name.eq_ignore_ascii_case(app)
}

#[cfg(target_os = "linux")]
mod linux {
    use super::{AppWindow, WindowSource};
    use crate::{DetectError, Result};
    use std::process::Command;
    use sysinfo::{Pid, System};

    /// Window list from `wmctrl -lp`, process names resolved through `sysinfo`.
    #[derive(Debug, Default)]
    pub struct WmctrlWindows;

    impl WmctrlWindows {
        pub fn new() -> Self {
            Self
        }
    }

    impl WindowSource for WmctrlWindows {
        fn windows(&self) -> Result<Vec<AppWindow>> {
            let output = Command::new("wmctrl").arg("-lp").output()?;
            if !output.status.success() {
                return Err(DetectError::Query(format!(
                    "wmctrl exited with {}",
                    output.status
                )));
            }

            let listing = String::from_utf8_lossy(&output.stdout);
            let entries = parse_wmctrl(&listing);

            let pids: Vec<Pid> = entries.iter().map(|(pid, _)| Pid::from_u32(*pid)).collect();
            let mut sys = System::new();
            sys.refresh_processes(sysinfo::ProcessesToUpdate::Some(&pids), true);

            Ok(entries
                .into_iter()
                .filter_map(|(pid, title)| {
                    let process = sys.process(Pid::from_u32(pid))?;
                    Some(AppWindow {
                        process_name: process.name().to_string_lossy().into_owned(),
                        title,
                    })
                })
                .collect())
        }
    }

    /// Parse `wmctrl -lp` lines: `<id> <desktop> <pid> <host> <title...>`.
    pub(super) fn parse_wmctrl(listing: &str) -> Vec<(u32, String)> {
        listing
            .lines()
            .filter_map(|line| {
                let mut rest = line.trim_start();
                let mut fields = Vec::with_capacity(4);
                for _ in 0..4 {
                    let end = rest.find(char::is_whitespace)?;
                    fields.push(&rest[..end]);
                    rest = rest[end..].trim_start();
                }
                let pid = fields[2].parse::<u32>().ok().filter(|pid| *pid != 0)?;
                Some((pid, rest.trim_end().to_string()))
            })
            .collect()
    }
}

#[cfg(target_os = "linux")]
pub use linux::WmctrlWindows as PlatformWindows;

#[cfg(not(target_os = "linux"))]
#[derive(Debug, Default)]
pub struct PlatformWindows;

#[cfg(not(target_os = "linux"))]
impl PlatformWindows {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_os = "linux"))]
impl WindowSource for PlatformWindows {
    fn windows(&self) -> Result<Vec<AppWindow>> {
        Err(crate::DetectError::Unsupported("window listing"))
    }
}
