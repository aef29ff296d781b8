//! Process-wide configuration.
//!
//! Read once at startup from a TOML file and immutable afterwards. Every key
//! is optional; missing keys fall back to the defaults below. Both snake_case
//! keys and the legacy PascalCase app-settings names are accepted.
//!
//! ```toml
//! camera_hardware_id = "VID_5986&PID_2113"
//! post_url = "http://192.168.0.96/json"
//! get_url = "http://192.168.0.96/win"
//! active_meeting_with_camera_preset = 1
//! poll_interval_ms = 5000
//! ```

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "ONAIR_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fragment matched case-insensitively against camera identifiers.
    #[serde(alias = "CameraHardwareId")]
    pub camera_hardware_id: String,

    /// Endpoint receiving `POST {"ps": <preset>}` on status changes.
    #[serde(alias = "PostUrl")]
    pub post_url: String,

    /// Endpoint receiving `GET <url>&T=1` at startup and `&T=0` at exit.
    #[serde(alias = "GetUrl")]
    pub get_url: String,

    #[serde(alias = "ActiveMeetingWithCameraPreset")]
    pub active_meeting_with_camera_preset: i32,

    #[serde(alias = "ActiveMeetingWithoutCameraPreset")]
    pub active_meeting_without_camera_preset: i32,

    #[serde(alias = "NoMeetingWithCameraPreset")]
    pub no_meeting_with_camera_preset: i32,

    #[serde(alias = "NoMeetingWithoutCameraPreset")]
    pub no_meeting_without_camera_preset: i32,

    /// Time between periodic checks.
    pub poll_interval_ms: u64,

    /// Upper bound on each outbound HTTP request.
    pub request_timeout_ms: u64,

    /// How long to watch the camera for an activity signal.
    pub camera_probe_ms: u64,

    /// How long to sample the microphone level.
    pub mic_probe_ms: u64,

    /// Sampling granularity within a probe.
    pub probe_step_ms: u64,

    /// Normalized peak level above which the microphone counts as active.
    pub mic_threshold: f32,

    /// Conferencing process names to watch.
    pub meeting_apps: Vec<String>,

    /// Window-title keywords that mark a call.
    pub meeting_keywords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_hardware_id: "VID_5986&PID_2113".to_string(),
            post_url: "http://192.168.0.96/json".to_string(),
            get_url: "http://192.168.0.96/win".to_string(),
            active_meeting_with_camera_preset: 1,
            active_meeting_without_camera_preset: 2,
            no_meeting_with_camera_preset: 5,
            no_meeting_without_camera_preset: 3,
            poll_interval_ms: 5000,
            request_timeout_ms: 5000,
            camera_probe_ms: 2000,
            mic_probe_ms: 2000,
            probe_step_ms: 100,
            mic_threshold: 0.01,
            meeting_apps: vec!["Teams".to_string(), "Zoom".to_string()],
            meeting_keywords: vec!["Meeting".to_string(), "Call".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `explicit`, `$ONAIR_CONFIG`, or the per-user config file,
    /// whichever comes first. Falls back to defaults when none is present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match resolve_path(explicit, env_path, default_path()) {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            None => {
                tracing::info!("no config file found, using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_url("post_url", &self.post_url)?;
        check_url("get_url", &self.get_url)?;

        for (field, value) in [
            ("poll_interval_ms", self.poll_interval_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("camera_probe_ms", self.camera_probe_ms),
            ("mic_probe_ms", self.mic_probe_ms),
            ("probe_step_ms", self.probe_step_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        if self.probe_step_ms > self.camera_probe_ms.min(self.mic_probe_ms) {
            return Err(ConfigError::Invalid {
                field: "probe_step_ms",
                message: "must not exceed the probe windows".to_string(),
            });
        }

        if !(self.mic_threshold > 0.0 && self.mic_threshold < 1.0) {
            return Err(ConfigError::Invalid {
                field: "mic_threshold",
                message: format!("{} is outside (0, 1)", self.mic_threshold),
            });
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn camera_probe(&self) -> Duration {
        Duration::from_millis(self.camera_probe_ms)
    }

    pub fn mic_probe(&self) -> Duration {
        Duration::from_millis(self.mic_probe_ms)
    }

    pub fn probe_step(&self) -> Duration {
        Duration::from_millis(self.probe_step_ms)
    }
}

fn check_url(field: &'static str, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::Invalid {
            field,
            message: "must not be empty".to_string(),
        });
    }
    let parsed = Url::parse(url).map_err(|e| ConfigError::Invalid {
        field,
        message: format!("'{url}' is not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::Invalid {
            field,
            message: format!("'{url}' is not an http(s) URL"),
        });
    }
    Ok(())
}

/// `<config_dir>/onair/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("onair").join("config.toml"))
}

/// Pick the config file to read. Explicit and environment paths are returned
/// even if missing so the read fails loudly; the default path only if it exists.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    default: Option<PathBuf>,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or(env_path.filter(|p| !p.as_os_str().is_empty()))
        .or_else(|| default.filter(|p| p.exists()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.camera_hardware_id, "VID_5986&PID_2113");
        assert_eq!(config.post_url, "http://192.168.0.96/json");
        assert_eq!(config.get_url, "http://192.168.0.96/win");
        assert_eq!(config.active_meeting_with_camera_preset, 1);
        assert_eq!(config.active_meeting_without_camera_preset, 2);
        assert_eq!(config.no_meeting_with_camera_preset, 5);
        assert_eq!(config.no_meeting_without_camera_preset, 3);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
            post_url = "http://10.0.0.5/json"
            no_meeting_without_camera_preset = 9
            "#,
        );

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.post_url, "http://10.0.0.5/json");
        assert_eq!(config.no_meeting_without_camera_preset, 9);
        assert_eq!(config.get_url, "http://192.168.0.96/win");
        assert_eq!(config.active_meeting_with_camera_preset, 1);
    }

    #[test]
    fn test_legacy_keys_accepted() {
        let file = write_config(
            r#"
            CameraHardwareId = "VID_046D&PID_0825"
            GetUrl = "http://lamp.local/win"
            ActiveMeetingWithCameraPreset = 7
            "#,
        );

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.camera_hardware_id, "VID_046D&PID_0825");
        assert_eq!(config.get_url, "http://lamp.local/win");
        assert_eq!(config.active_meeting_with_camera_preset, 7);
    }

    #[test]
    fn test_non_integer_preset_is_fatal() {
        let file = write_config(r#"active_meeting_with_camera_preset = "one""#);
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config {
            post_url: "192.168.0.96/json".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "post_url", .. })
        ));

        config = Config {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "poll_interval_ms", .. })
        ));

        config = Config {
            mic_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "mic_threshold", .. })
        ));

        config = Config {
            probe_step_ms: 3000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "probe_step_ms", .. })
        ));
    }

    #[test]
    fn test_malformed_urls_are_rejected() {
        for bad in ["http://", "http:// bad host", "ftp://192.168.0.96/json", "http://[::1"] {
            let config = Config {
                get_url: bad.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::Invalid { field: "get_url", .. })
                ),
                "accepted {bad:?}"
            );
        }

        let config = Config {
            post_url: "https://onair.local:8080/json".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_path_precedence() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("config.toml");
        std::fs::write(&existing, "").unwrap();
        let explicit = dir.path().join("explicit.toml");
        let env = dir.path().join("env.toml");

        assert_eq!(
            resolve_path(Some(&explicit), Some(env.clone()), Some(existing.clone())),
            Some(explicit)
        );
        assert_eq!(
            resolve_path(None, Some(env.clone()), Some(existing.clone())),
            Some(env)
        );
        assert_eq!(
            resolve_path(None, None, Some(existing.clone())),
            Some(existing)
        );
        assert_eq!(
            resolve_path(None, None, Some(dir.path().join("absent.toml"))),
            None
        );
    }

    #[test]
    fn test_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config, deserialized);
    }
}
