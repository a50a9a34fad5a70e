//! The published magnitude spectrum.

use std::sync::Arc;

/// A frequency-domain magnitude spectrum.
///
/// Holds one non-negative, clamped magnitude per kept frequency bin, in bin
/// order. The bins are stored in an `Arc` so publishing and reading share
/// the data instead of copying it; a published spectrum is replaced whole,
/// never mutated in place.
///
/// # Example
///
/// ```
/// use spectrum_stream::MagnitudeSpectrum;
///
/// let spectrum = MagnitudeSpectrum::zeroed(100);
/// assert_eq!(spectrum.len(), 100);
/// assert_eq!(spectrum.downsampled(20).len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeSpectrum {
    bins: Arc<Vec<f32>>,
}

impl MagnitudeSpectrum {
    /// Creates a spectrum from per-bin magnitudes.
    #[must_use]
    pub fn new(bins: Vec<f32>) -> Self {
        Self {
            bins: Arc::new(bins),
        }
    }

    /// Creates an all-zero spectrum of the given length.
    ///
    /// This is the value the render side sees before the first analysis
    /// result and after the pipeline stops.
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0.0; len])
    }

    /// Returns the per-bin magnitudes in bin order.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.bins
    }

    /// Returns the number of bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Returns `true` if the spectrum has no bins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Returns every `stride`-th bin (indices 0, `stride`, `2 * stride`,
    /// and so on), preserving bin order.
    ///
    /// Derived on demand from the current bins, so it can never mix values
    /// from two different spectra. A stride of 0 is treated as 1.
    #[must_use]
    pub fn downsampled(&self, stride: usize) -> Vec<f32> {
        self.bins.iter().step_by(stride.max(1)).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed() {
        let spectrum = MagnitudeSpectrum::zeroed(100);
        assert_eq!(spectrum.len(), 100);
        assert!(spectrum.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_downsampled_length_and_indices() {
        let bins: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let spectrum = MagnitudeSpectrum::new(bins);

        let view = spectrum.downsampled(20);
        assert_eq!(view.len(), 5);
        assert_eq!(view, vec![0.0, 20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_downsampled_zero_stride() {
        let spectrum = MagnitudeSpectrum::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(spectrum.downsampled(0), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clone_shares_bins() {
        let spectrum = MagnitudeSpectrum::new(vec![0.5; 100]);
        let copy = spectrum.clone();
        assert_eq!(spectrum, copy);
        assert!(Arc::ptr_eq(&spectrum.bins, &copy.bins));
    }
}
