//! CPAL device wrapper for feeding the analysis pipeline.

use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig as CpalStreamConfig};
use tokio::task::JoinHandle;

use crate::error::SpectrumStreamError;
use crate::frame::i16_to_f32;
use crate::ingest::BufferIngestor;
use crate::source::frame_buffer::{create_frame_buffer, FrameBuffer};

/// Configuration for audio capture.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Ring buffer capacity in samples.
    pub buffer_capacity: usize,
    /// How often the bridge task checks for complete frames.
    pub poll_interval: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            // One second at 48kHz
            buffer_capacity: 48000,
            poll_interval: Duration::from_millis(5),
        }
    }
}

/// Wrapper around a CPAL audio input device.
///
/// Handles device selection and stream configuration, and bridges the
/// device callback into a [`BufferIngestor`]: the callback pushes
/// first-channel samples into a ring buffer, and a background task
/// assembles fixed-length frames and submits them.
#[must_use]
pub struct AudioDevice {
    device: Device,
    config: CaptureConfig,
}

impl AudioDevice {
    /// Opens the default input device.
    ///
    /// # Errors
    ///
    /// Returns `NoDefaultDevice` if no default input device is configured.
    pub fn open_default() -> Result<Self, SpectrumStreamError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(SpectrumStreamError::NoDefaultDevice)?;

        Ok(Self {
            device,
            config: CaptureConfig::default(),
        })
    }

    /// Opens a specific input device by name.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` if no device with the given name exists.
    pub fn open_by_name(name: &str) -> Result<Self, SpectrumStreamError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| SpectrumStreamError::BackendError(e.to_string()))?;

        for device in devices {
            if let Ok(device_name) = device.name() {
                if device_name == name {
                    return Ok(Self {
                        device,
                        config: CaptureConfig::default(),
                    });
                }
            }
        }

        Err(SpectrumStreamError::DeviceNotFound {
            name: name.to_string(),
        })
    }

    /// Sets the capture configuration.
    pub fn with_config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "unknown".to_string())
    }

    /// Returns the device's native capture format (sample rate, channels).
    pub fn native_config(&self) -> Result<(u32, u16), SpectrumStreamError> {
        let config = self
            .device
            .default_input_config()
            .map_err(|e| SpectrumStreamError::BackendError(e.to_string()))?;
        Ok((config.sample_rate().0, config.channels()))
    }

    /// Starts capturing audio into the given ingestor.
    ///
    /// The returned `CaptureStream` must be kept alive for capture to
    /// continue. Frames of exactly `frame_len` samples are submitted as
    /// they fill up.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be built or started, or the
    /// device's sample format is unsupported.
    pub fn start_capture(
        &self,
        frame_len: usize,
        ingestor: BufferIngestor,
    ) -> Result<CaptureStream, SpectrumStreamError> {
        let (producer, frames) = create_frame_buffer(self.config.buffer_capacity, frame_len);

        let supported_config = self
            .device
            .default_input_config()
            .map_err(|e| SpectrumStreamError::BackendError(e.to_string()))?;

        let sample_format = supported_config.sample_format();
        let cpal_config: CpalStreamConfig = supported_config.into();

        let stream = match sample_format {
            SampleFormat::I16 => self.build_i16_stream(&cpal_config, producer)?,
            SampleFormat::F32 => self.build_f32_stream(&cpal_config, producer)?,
            format => {
                return Err(SpectrumStreamError::UnsupportedFormat {
                    format: format!("{format:?}"),
                });
            }
        };

        stream
            .play()
            .map_err(|e| SpectrumStreamError::BackendError(e.to_string()))?;

        tracing::info!(device = %self.name(), frame_len, "audio capture started");

        let bridge = spawn_frame_bridge(frames, ingestor, self.config.poll_interval);

        Ok(CaptureStream {
            _stream: stream,
            bridge,
        })
    }

    fn build_f32_stream(
        &self,
        config: &CpalStreamConfig,
        mut producer: ringbuf::HeapProd<f32>,
    ) -> Result<Stream, SpectrumStreamError> {
        use ringbuf::traits::Producer;

        let channels = config.channels.max(1) as usize;
        let stream = self
            .device
            .build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // First channel only - non-blocking push, drops samples
                    // if the buffer is full
                    for frame in data.chunks(channels) {
                        let _ = producer.try_push(frame[0]);
                    }
                },
                |err| {
                    tracing::error!("audio stream error: {err}");
                },
                None,
            )
            .map_err(|e| SpectrumStreamError::BackendError(e.to_string()))?;

        Ok(stream)
    }

    fn build_i16_stream(
        &self,
        config: &CpalStreamConfig,
        mut producer: ringbuf::HeapProd<f32>,
    ) -> Result<Stream, SpectrumStreamError> {
        use ringbuf::traits::Producer;

        let channels = config.channels.max(1) as usize;
        let stream = self
            .device
            .build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    // Inline conversion keeps the audio callback cheap
                    for frame in data.chunks(channels) {
                        let _ = producer.try_push(i16_to_f32(frame[0]));
                    }
                },
                |err| {
                    tracing::error!("audio stream error: {err}");
                },
                None,
            )
            .map_err(|e| SpectrumStreamError::BackendError(e.to_string()))?;

        Ok(stream)
    }
}

/// Spawns the bridge task that moves assembled frames into the ingestor.
fn spawn_frame_bridge(
    mut frames: FrameBuffer,
    ingestor: BufferIngestor,
    poll_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);
        loop {
            interval.tick().await;
            while let Some(frame) = frames.try_read_frame() {
                ingestor.submit(frame);
            }
        }
    })
}

/// A running audio capture stream.
///
/// Capture continues while this struct is held. Dropping it stops the CPAL
/// stream and the frame bridge task - a simple RAII wrapper, no explicit
/// stop needed.
pub struct CaptureStream {
    /// The underlying CPAL stream. Dropping this stops capture.
    _stream: Stream,
    bridge: JoinHandle<()>,
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.bridge.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.buffer_capacity, 48000);
        assert_eq!(config.poll_interval, Duration::from_millis(5));
    }

    // Note: Device tests require actual audio hardware and are skipped in CI
    #[test]
    #[ignore = "requires audio hardware"]
    fn test_open_default_device() {
        let device = AudioDevice::open_default().unwrap();
        println!("Default device: {}", device.name());
    }
}
