//! # spectrum-stream
//!
//! Real-time audio spectrum analysis with non-blocking ingestion and
//! snapshot publication.
//!
//! `spectrum-stream` turns a stream of PCM sample buffers into a smoothed,
//! bounded magnitude spectrum suitable for plotting at a display's refresh
//! cadence. The audio callback and the render loop run at different,
//! unsynchronized rates; the crate's job is to connect them without ever
//! blocking the audio thread or handing the renderer a malformed value.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spectrum_stream::{AnalyzerConfig, AnalysisPipeline, SampleBuffer};
//!
//! let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
//! let ingestor = pipeline.ingestor();
//! let reader = pipeline.reader();
//!
//! pipeline.start()?;
//!
//! // Audio callback (any thread, once per hardware period):
//! ingestor.render_interleaved(pcm_data, channels);
//!
//! // Render loop (its own cadence):
//! for (i, magnitude) in reader.read_downsampled().iter().enumerate() {
//!     plot(i, *magnitude);
//! }
//!
//! pipeline.stop().await;
//! ```
//!
//! ## Architecture
//!
//! The crate maintains a strict thread boundary:
//!
//! ```text
//! Audio Callback → BufferIngestor → bounded channel → Analysis Task
//!     → TransformEngine → SpectrumStore → SpectrumReader (render side)
//! ```
//!
//! - **Audio thread**: only ever calls [`BufferIngestor`]; delivery is a
//!   `try_send` that drops the newest buffer rather than block
//! - **Analysis task**: a tokio background task, one buffer in flight at a
//!   time, so the transform resource needs no lock and spectra are
//!   published in arrival order
//! - **Render side**: non-blocking whole-value snapshots; every value is in
//!   `[0, magnitude_limit]` and every spectrum has the configured length,
//!   on every path including failure
//!
//! Enable the `capture` feature for a CPAL-backed input device source.

#![warn(missing_docs)]
// Audio code requires intentional numeric casts between sample formats
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

mod config;
mod error;
mod frame;
mod ingest;
mod pipeline;
pub mod source;
mod spectrum;
mod store;
mod transform;

pub use config::AnalyzerConfig;
pub use error::SpectrumStreamError;
pub use frame::{i16_to_f32, SampleBuffer};
pub use ingest::BufferIngestor;
pub use pipeline::{AnalysisPipeline, PipelineStats};
pub use spectrum::MagnitudeSpectrum;
pub use store::SpectrumReader;
pub use transform::TransformEngine;

pub use source::MockSource;
#[cfg(feature = "capture")]
pub use source::{AudioDevice, CaptureConfig, CaptureStream};
