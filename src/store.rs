//! Latest-value publication of the magnitude spectrum.
//!
//! The store is a single-writer hand-off between the analysis task and the
//! render side. Only the pipeline holds a publishing handle, so writer
//! exclusion is structural rather than lock-based; each publish is a
//! whole-value snapshot swap, so a reader can never observe a
//! partially-updated spectrum, and cross-thread visibility comes from the
//! watch channel itself.

use std::sync::Arc;

use tokio::sync::watch;

use crate::spectrum::MagnitudeSpectrum;

/// Publishing side of the spectrum hand-off.
///
/// Held by the pipeline; never exposed outside the crate, which is what
/// keeps the store single-writer.
#[derive(Clone)]
pub(crate) struct SpectrumStore {
    tx: Arc<watch::Sender<MagnitudeSpectrum>>,
    downsample_factor: usize,
}

impl SpectrumStore {
    /// Creates a store pre-loaded with an all-zero spectrum.
    pub fn new(spectrum_bins: usize, downsample_factor: usize) -> Self {
        let (tx, _rx) = watch::channel(MagnitudeSpectrum::zeroed(spectrum_bins));
        Self {
            tx: Arc::new(tx),
            downsample_factor,
        }
    }

    /// Replaces the current spectrum.
    ///
    /// Succeeds whether or not any reader is subscribed.
    pub fn publish(&self, spectrum: MagnitudeSpectrum) {
        self.tx.send_replace(spectrum);
    }

    /// Creates a reader observing this store.
    pub fn subscribe(&self) -> SpectrumReader {
        SpectrumReader {
            rx: self.tx.subscribe(),
            downsample_factor: self.downsample_factor,
        }
    }
}

/// Read surface for the render side.
///
/// Obtained from [`AnalysisPipeline::reader`](crate::AnalysisPipeline::reader).
/// Reads are non-blocking snapshots of the latest published spectrum; a
/// render loop polls at its own refresh cadence, or awaits
/// [`changed`](Self::changed) to wake exactly when a new spectrum lands.
///
/// # Example
///
/// ```ignore
/// let reader = pipeline.reader();
/// // In the render loop, at the display's refresh cadence:
/// for (i, magnitude) in reader.read_downsampled().iter().enumerate() {
///     plot(i, *magnitude);
/// }
/// ```
#[derive(Clone)]
pub struct SpectrumReader {
    rx: watch::Receiver<MagnitudeSpectrum>,
    downsample_factor: usize,
}

impl SpectrumReader {
    /// Returns the latest published spectrum.
    ///
    /// Non-blocking; before the first analysis result (and after the
    /// pipeline stops) this is the all-zero spectrum.
    #[must_use]
    pub fn read(&self) -> MagnitudeSpectrum {
        self.rx.borrow().clone()
    }

    /// Returns the downsampled view of the latest spectrum.
    ///
    /// Derived from a single snapshot, so it is always consistent with one
    /// published spectrum - never a stale mix of two.
    #[must_use]
    pub fn read_downsampled(&self) -> Vec<f32> {
        self.read().downsampled(self.downsample_factor)
    }

    /// Waits until a spectrum newer than the last one seen by this reader
    /// is published.
    ///
    /// Returns `false` if the pipeline (and with it the publishing side)
    /// has gone away entirely.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_value_is_zeroed() {
        let store = SpectrumStore::new(100, 20);
        let reader = store.subscribe();

        let spectrum = reader.read();
        assert_eq!(spectrum.len(), 100);
        assert!(spectrum.values().iter().all(|&v| v == 0.0));
        assert_eq!(reader.read_downsampled(), vec![0.0; 5]);
    }

    #[test]
    fn test_publish_replaces_whole_value() {
        let store = SpectrumStore::new(100, 20);
        let reader = store.subscribe();

        store.publish(MagnitudeSpectrum::new(vec![0.5; 100]));
        assert!(reader.read().values().iter().all(|&v| v == 0.5));

        store.publish(MagnitudeSpectrum::new(vec![0.9; 100]));
        assert!(reader.read().values().iter().all(|&v| v == 0.9));
    }

    #[test]
    fn test_downsampled_matches_full_read() {
        let store = SpectrumStore::new(100, 20);
        let reader = store.subscribe();

        let bins: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        store.publish(MagnitudeSpectrum::new(bins));

        let full = reader.read();
        let view = reader.read_downsampled();
        assert_eq!(view.len(), 5);
        for (i, &value) in view.iter().enumerate() {
            assert_eq!(value, full.values()[i * 20]);
        }
    }

    #[test]
    fn test_publish_without_readers() {
        let store = SpectrumStore::new(100, 20);
        // No subscriber exists; publishing must still succeed.
        store.publish(MagnitudeSpectrum::new(vec![0.1; 100]));

        let reader = store.subscribe();
        assert!(reader.read().values().iter().all(|&v| v == 0.1));
    }

    #[tokio::test]
    async fn test_changed_wakes_on_publish() {
        let store = SpectrumStore::new(100, 20);
        let mut reader = store.subscribe();

        store.publish(MagnitudeSpectrum::new(vec![0.7; 100]));
        assert!(reader.changed().await);
        assert!(reader.read().values().iter().all(|&v| v == 0.7));
    }
}
