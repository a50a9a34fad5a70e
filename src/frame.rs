//! Audio sample buffers and PCM adaptation helpers.

/// Converts an i16 PCM sample to f32.
///
/// Output is in the range [-1.0, 1.0).
#[inline]
#[must_use]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

/// One slice of continuous audio as delivered by the capture source.
///
/// `SampleBuffer` is the unit of data flowing from the audio callback into
/// the analysis pipeline: mono, single-precision, variable length (whatever
/// the hardware period produced). Buffers are ephemeral - created per
/// callback, consumed by the analysis task, then discarded.
///
/// # Example
///
/// ```
/// use spectrum_stream::SampleBuffer;
///
/// // Stereo interleaved delivery: only the first channel is analyzed.
/// let buffer = SampleBuffer::from_interleaved(&[0.1, 0.9, 0.2, 0.8], 2);
/// assert_eq!(buffer.samples(), &[0.1, 0.2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
}

impl SampleBuffer {
    /// Creates a buffer from mono f32 samples.
    #[must_use]
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Adapts an interleaved multi-channel f32 buffer by selecting the
    /// first channel.
    ///
    /// A zero channel count yields an empty buffer, which the ingestor
    /// drops silently.
    #[must_use]
    pub fn from_interleaved(data: &[f32], channels: u16) -> Self {
        if channels == 0 {
            return Self::new(Vec::new());
        }
        let samples = data.iter().step_by(channels as usize).copied().collect();
        Self { samples }
    }

    /// Adapts an interleaved multi-channel i16 buffer: selects the first
    /// channel and converts it to f32.
    #[must_use]
    pub fn from_interleaved_i16(data: &[i16], channels: u16) -> Self {
        if channels == 0 {
            return Self::new(Vec::new());
        }
        let samples = data
            .iter()
            .step_by(channels as usize)
            .map(|&s| i16_to_f32(s))
            .collect();
        Self { samples }
    }

    /// Returns the samples.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if this buffer contains no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consumes the buffer, returning its samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

impl From<Vec<f32>> for SampleBuffer {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}
