//! Error types for spectrum-stream.
//!
//! Errors are split into two categories:
//! - **Fatal errors** ([`SpectrumStreamError`]): Prevent the pipeline or a
//!   capture source from starting
//! - **Recoverable conditions**: Mismatched buffers, full queues, and a
//!   missing transform resource are handled locally by dropping data or
//!   substituting a zeroed spectrum; they never surface as errors

/// Fatal errors that prevent the pipeline or a capture source from starting.
///
/// These are returned synchronously from [`AnalysisPipeline::start()`] and
/// the capture-source constructors. Runtime issues on the audio path are
/// never errors: the audio thread must not be blocked or crashed by the
/// analysis side.
///
/// [`AnalysisPipeline::start()`]: crate::AnalysisPipeline::start
#[derive(Debug, thiserror::Error)]
pub enum SpectrumStreamError {
    /// The transform resource could not be allocated.
    ///
    /// The pipeline stays idle; no partial state is left behind.
    #[error("transform setup failed for frame length {frame_len}: {reason}")]
    TransformInit {
        /// The frame length the transform was sized for.
        frame_len: usize,
        /// Why allocation was refused.
        reason: String,
    },

    /// The requested audio input device was not found.
    #[error("device not found: {name}")]
    DeviceNotFound {
        /// Name of the device that wasn't found.
        name: String,
    },

    /// No default input device is configured on this system.
    #[error("no default input device configured")]
    NoDefaultDevice,

    /// The device's sample format is not supported.
    #[error("unsupported sample format: {format}")]
    UnsupportedFormat {
        /// The format that wasn't supported.
        format: String,
    },

    /// An error from the underlying audio backend (CPAL).
    #[error("audio backend error: {0}")]
    BackendError(String),
}
