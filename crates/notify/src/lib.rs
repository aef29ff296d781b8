//! Outbound notifications to the "on air" indicator.
//!
//! Two channels:
//! - status: `POST <post_url>` with `{"ps": <preset>}`
//! - control: `GET <get_url>&T=1` at session start, `&T=0` at session end
//!
//! Every request is bounded by a timeout. Failures are returned to the caller
//! and never retried.

mod error;

pub use error::{NotifyError, Result};

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Default upper bound on a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Session signal sent on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlag {
    Start,
    End,
}

impl SessionFlag {
    /// Value of the `T` query parameter.
    pub fn query_value(self) -> u8 {
        match self {
            SessionFlag::Start => 1,
            SessionFlag::End => 0,
        }
    }
}

/// Wire body of a status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetPayload {
    pub ps: i32,
}

/// Delivers status and control notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the preset code to the status endpoint.
    async fn notify_status(&self, preset_code: i32) -> Result<()>;

    /// Signal session start or end on the control endpoint.
    async fn notify_control(&self, flag: SessionFlag) -> Result<()>;
}

/// Control URL for `flag`. The flag is appended verbatim as `&T=<0|1>`.
pub fn control_url(get_url: &str, flag: SessionFlag) -> String {
    format!("{}&T={}", get_url, flag.query_value())
}

/// [`Notifier`] over HTTP.
pub struct HttpNotifier {
    client: reqwest::Client,
    post_url: String,
    get_url: String,
}

impl HttpNotifier {
    pub fn new(post_url: impl Into<String>, get_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(post_url, get_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        post_url: impl Into<String>,
        get_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            post_url: post_url.into(),
            get_url: get_url.into(),
        })
    }

    fn check_status(url: &str, resp: &reqwest::Response) -> Result<()> {
        if !resp.status().is_success() {
            return Err(NotifyError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify_status(&self, preset_code: i32) -> Result<()> {
        let url = self.post_url.as_str();
        tracing::debug!(url, preset = preset_code, "sending status");

        let resp = self
            .client
            .post(url)
            .json(&PresetPayload { ps: preset_code })
            .send()
            .await
            .map_err(|e| NotifyError::from_reqwest(url, e))?;

        Self::check_status(url, &resp)
    }

    async fn notify_control(&self, flag: SessionFlag) -> Result<()> {
        let url = control_url(&self.get_url, flag);
        tracing::debug!(url = %url, "sending control signal");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NotifyError::from_reqwest(&url, e))?;

        Self::check_status(&url, &resp)
    }
}
