//! Forward frequency transform and magnitude extraction.

use std::sync::Arc;

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

use crate::config::AnalyzerConfig;
use crate::error::SpectrumStreamError;
use crate::frame::SampleBuffer;
use crate::spectrum::MagnitudeSpectrum;

/// The allocated transform plan plus reusable scratch buffers.
///
/// Scoped to one start/stop cycle of the pipeline: acquired by
/// [`TransformEngine::create`], released by [`TransformEngine::destroy`].
struct TransformResource {
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    output: Vec<Complex<f32>>,
}

/// Computes clamped magnitude spectra over fixed-size frames.
///
/// The engine wraps a real-to-complex forward transform sized for
/// `frame_len` samples. Scratch buffers are allocated once and reused for
/// every frame, keeping the per-buffer hot path allocation-light. Execution
/// is deterministic: the same input bits always produce the same output
/// bits.
///
/// The engine is only ever driven by one caller at a time (the analysis
/// task processes a single buffer in flight), so no locking is needed
/// around the plan or its scratch space.
pub struct TransformEngine {
    frame_len: usize,
    spectrum_bins: usize,
    magnitude_limit: f32,
    resource: Option<TransformResource>,
}

impl TransformEngine {
    /// Creates an engine for the given configuration.
    ///
    /// No transform resource is allocated yet; call [`create`](Self::create)
    /// before the first [`execute`](Self::execute).
    #[must_use]
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            frame_len: config.frame_len,
            spectrum_bins: config.spectrum_bins,
            magnitude_limit: config.magnitude_limit,
            resource: None,
        }
    }

    /// Allocates the transform plan and scratch buffers.
    ///
    /// A no-op if the resource is already live.
    ///
    /// # Errors
    ///
    /// Returns [`SpectrumStreamError::TransformInit`] for a configuration
    /// the transform cannot satisfy: a zero frame length, zero bins, or
    /// more bins requested than the transform produces (`frame_len / 2 + 1`).
    pub fn create(&mut self) -> Result<(), SpectrumStreamError> {
        if self.resource.is_some() {
            return Ok(());
        }

        if self.frame_len == 0 {
            return Err(SpectrumStreamError::TransformInit {
                frame_len: 0,
                reason: "frame length must be non-zero".to_string(),
            });
        }

        let available_bins = self.frame_len / 2 + 1;
        if self.spectrum_bins == 0 || self.spectrum_bins > available_bins {
            return Err(SpectrumStreamError::TransformInit {
                frame_len: self.frame_len,
                reason: format!(
                    "cannot keep {} of {} available bins",
                    self.spectrum_bins, available_bins
                ),
            });
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(self.frame_len);

        self.resource = Some(TransformResource {
            input: vec![0.0; self.frame_len],
            output: vec![Complex::new(0.0, 0.0); available_bins],
            plan,
        });

        tracing::debug!(
            frame_len = self.frame_len,
            bins = self.spectrum_bins,
            "transform resource allocated"
        );
        Ok(())
    }

    /// Returns `true` if the transform resource is live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.resource.is_some()
    }

    /// Transforms one buffer into a magnitude spectrum.
    ///
    /// The buffer is adapted to the frame length: shorter buffers are
    /// zero-padded, longer ones truncated to the first `frame_len` samples.
    /// Per-bin magnitude is `sqrt(re^2 + im^2)`, kept for the first
    /// `spectrum_bins` bins only and clamped to the magnitude limit -
    /// a hard `min`, so clipped peaks are flattened, not rescaled.
    ///
    /// With no live resource this returns an all-zero spectrum instead of
    /// failing; the render side always gets a well-formed value.
    pub fn execute(&mut self, buffer: &SampleBuffer) -> MagnitudeSpectrum {
        let Some(resource) = self.resource.as_mut() else {
            return MagnitudeSpectrum::zeroed(self.spectrum_bins);
        };

        let samples = buffer.samples();
        let copy_len = samples.len().min(self.frame_len);
        resource.input[..copy_len].copy_from_slice(&samples[..copy_len]);
        resource.input[copy_len..].fill(0.0);

        if let Err(e) = resource.plan.process(&mut resource.input, &mut resource.output) {
            tracing::error!("forward transform failed: {e}");
            return MagnitudeSpectrum::zeroed(self.spectrum_bins);
        }

        let limit = self.magnitude_limit;
        let bins = resource.output[..self.spectrum_bins]
            .iter()
            .map(|c| c.norm().min(limit))
            .collect();

        MagnitudeSpectrum::new(bins)
    }

    /// Releases the transform resource.
    ///
    /// Idempotent: calling on an already-destroyed or never-created
    /// resource is a no-op.
    pub fn destroy(&mut self) {
        if self.resource.take().is_some() {
            tracing::debug!("transform resource released");
        }
    }
}
