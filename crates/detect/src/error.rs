//! Error types for device oracles.

use thiserror::Error;

/// Errors raised by a device oracle.
///
/// None of these escape the probing policies in [`crate::probe`]; they are
/// logged and folded into the conservative default for the device.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The configured device could not be found.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The device was found but querying it failed.
    #[error("device query failed: {0}")]
    Query(String),

    /// Audio backend failure while opening or reading the input meter.
    #[error("audio error: {0}")]
    Audio(String),

    /// No oracle implementation exists for this platform.
    #[error("not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DetectError>;
