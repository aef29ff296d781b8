use crate::{DetectError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A live input level meter. Dropping it releases the audio endpoint.
pub trait PeakMeter {
    /// Peak amplitude on a normalized 0..=1 scale since the previous read.
    fn peak(&mut self) -> Result<f32>;
}

/// Oracle giving access to the default input's level meter.
pub trait MicrophoneActivity: Send + Sync {
    fn open_meter(&self) -> Result<Box<dyn PeakMeter + '_>>;
}

/// Level meter over the default `cpal` input device.
#[derive(Debug, Default)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    pub fn new() -> Self {
        Self
    }
}

impl MicrophoneActivity for CpalMicrophone {
    fn open_meter(&self) -> Result<Box<dyn PeakMeter + '_>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| DetectError::DeviceNotFound("default input".to_string()))?;
        let config = device
            .default_input_config()
            .map_err(|e| DetectError::Audio(format!("failed to get default config: {e}")))?;

        // f32 bits of the running max, reset on every read
        let level = Arc::new(AtomicU32::new(0));
        let stream = match config.sample_format() {
            SampleFormat::F32 => {
                let level = level.clone();
                device.build_input_stream(
                    &config.into(),
                    move |data: &[f32], _| record_peak(&level, data.iter().copied()),
                    |err| tracing::warn!("mic meter stream error: {}", err),
                    None,
                )
            }
            SampleFormat::I16 => {
                let level = level.clone();
                device.build_input_stream(
                    &config.into(),
                    move |data: &[i16], _| {
                        record_peak(&level, data.iter().map(|&s| s as f32 / 32768.0))
                    },
                    |err| tracing::warn!("mic meter stream error: {}", err),
                    None,
                )
            }
            SampleFormat::U16 => {
                let level = level.clone();
                device.build_input_stream(
                    &config.into(),
                    move |data: &[u16], _| {
                        record_peak(
                            &level,
                            data.iter().map(|&s| (s as f32 - 32768.0) / 32768.0),
                        )
                    },
                    |err| tracing::warn!("mic meter stream error: {}", err),
                    None,
                )
            }
            format => {
                return Err(DetectError::Audio(format!(
                    "unsupported sample format: {format:?}"
                )))
            }
        }
        .map_err(|e| DetectError::Audio(e.to_string()))?;

        stream
            .play()
            .map_err(|e| DetectError::Audio(e.to_string()))?;

        Ok(Box::new(CpalMeter {
            _stream: stream,
            level,
        }))
    }
}

struct CpalMeter {
    _stream: Stream,
    level: Arc<AtomicU32>,
}

impl PeakMeter for CpalMeter {
    fn peak(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.level.swap(0, Ordering::Relaxed)))
    }
}

fn record_peak(level: &AtomicU32, samples: impl Iterator<Item = f32>) {
    let chunk_peak = samples.fold(0.0f32, |acc, s| acc.max(s.abs())).min(1.0);
    // Non-negative floats order the same as their bit patterns.
    level.fetch_max(chunk_peak.to_bits(), Ordering::Relaxed);
}
