use thiserror::Error;

/// Failure to deliver a notification. Never retried.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid endpoint '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl NotifyError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotifyError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_builder() {
            NotifyError::InvalidUrl {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            NotifyError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;
