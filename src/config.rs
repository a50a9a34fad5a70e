//! Configuration for the analysis pipeline.

/// Configuration for spectral analysis.
///
/// Use [`AnalyzerConfig::default()`] for the standard display configuration,
/// or customize as needed.
///
/// # Example
///
/// ```
/// use spectrum_stream::AnalyzerConfig;
///
/// let config = AnalyzerConfig {
///     queue_capacity: 16,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Number of samples per analysis frame (the transform size).
    ///
    /// Delivered buffers that are shorter are zero-padded; longer buffers
    /// are truncated to the first `frame_len` samples.
    /// Default: 480 (10ms at 48kHz)
    pub frame_len: usize,

    /// Number of low-frequency bins kept per published spectrum.
    ///
    /// The transform produces `frame_len / 2 + 1` bins; everything above
    /// `spectrum_bins` is discarded in favor of display resolution.
    /// Default: 100
    pub spectrum_bins: usize,

    /// Stride for the downsampled display view.
    ///
    /// [`SpectrumReader::read_downsampled`](crate::SpectrumReader::read_downsampled)
    /// keeps bins at indices 0, `downsample_factor`, `2 * downsample_factor`,
    /// and so on.
    /// Default: 20
    pub downsample_factor: usize,

    /// Hard per-bin magnitude clamp.
    ///
    /// Values above the limit are flattened to it, not rescaled, so clipped
    /// peaks do not distort the rest of the chart.
    /// Default: 1.0
    pub magnitude_limit: f32,

    /// Capacity of the ingestion queue in buffers.
    ///
    /// When the analysis task falls behind, the newest buffers are dropped
    /// producer-side rather than ever blocking the audio callback.
    /// Default: 8 (a few hardware periods of slack)
    pub queue_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frame_len: 480,
            spectrum_bins: 100,
            downsample_factor: 20,
            magnitude_limit: 1.0,
            queue_capacity: 8,
        }
    }
}

impl AnalyzerConfig {
    /// Returns the length of the downsampled view for this configuration.
    #[must_use]
    pub fn downsampled_len(&self) -> usize {
        if self.downsample_factor == 0 {
            return self.spectrum_bins;
        }
        self.spectrum_bins.div_ceil(self.downsample_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_config_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.frame_len, 480);
        assert_eq!(config.spectrum_bins, 100);
        assert_eq!(config.downsample_factor, 20);
        assert_eq!(config.magnitude_limit, 1.0);
        assert_eq!(config.queue_capacity, 8);
    }

    #[test]
    fn test_downsampled_len() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.downsampled_len(), 5);

        let uneven = AnalyzerConfig {
            spectrum_bins: 101,
            ..Default::default()
        };
        assert_eq!(uneven.downsampled_len(), 6);
    }

    #[test]
    fn test_downsampled_len_zero_factor() {
        let config = AnalyzerConfig {
            downsample_factor: 0,
            ..Default::default()
        };
        assert_eq!(config.downsampled_len(), 100);
    }
}
