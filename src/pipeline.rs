//! Analysis pipeline lifecycle and background task.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::AnalyzerConfig;
use crate::error::SpectrumStreamError;
use crate::frame::SampleBuffer;
use crate::ingest::BufferIngestor;
use crate::spectrum::MagnitudeSpectrum;
use crate::store::{SpectrumReader, SpectrumStore};
use crate::transform::TransformEngine;

/// Statistics about a pipeline, taken as a snapshot.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Buffers forwarded into the analysis stream.
    pub buffers_received: u64,
    /// Buffers dropped at ingestion (no consumer or full queue).
    pub buffers_dropped: u64,
    /// Spectra published to the store.
    pub spectra_published: u64,
}

/// State shared between the pipeline handle and its background task.
struct PipelineState {
    running: AtomicBool,
    spectra_published: AtomicU64,
}

/// The background task: awaits buffers, transforms them, publishes spectra.
///
/// One buffer is in flight at a time - the sequential await structure is
/// what serializes access to the transform resource and guarantees spectra
/// are published in arrival order.
struct AnalysisWorker {
    engine: TransformEngine,
    rx: mpsc::Receiver<SampleBuffer>,
    store: SpectrumStore,
    state: Arc<PipelineState>,
}

impl AnalysisWorker {
    /// Runs until the ingestion stream detaches or ends.
    ///
    /// Returns the engine so [`AnalysisPipeline::stop`] can release the
    /// transform resource even when the stream ended on its own.
    async fn run(mut self) -> TransformEngine {
        while let Some(buffer) = self.rx.recv().await {
            // A stop may have landed while this buffer sat in the queue;
            // exit without processing it.
            if !self.state.running.load(Ordering::SeqCst) {
                break;
            }

            let spectrum = self.engine.execute(&buffer);
            self.store.publish(spectrum);

            let published = self.state.spectra_published.fetch_add(1, Ordering::SeqCst) + 1;
            if published % 50 == 0 {
                tracing::debug!(published, "analysis progress");
            }
        }
        tracing::debug!("ingestion stream ended");
        self.engine
    }
}

/// Spawns the analysis worker as a background task.
fn spawn_analysis_worker(
    engine: TransformEngine,
    rx: mpsc::Receiver<SampleBuffer>,
    store: SpectrumStore,
    state: Arc<PipelineState>,
) -> JoinHandle<TransformEngine> {
    let worker = AnalysisWorker {
        engine,
        rx,
        store,
        state,
    };
    tokio::spawn(worker.run())
}

/// Streaming spectral analysis with an explicit start/stop lifecycle.
///
/// The pipeline pulls sample buffers from its [`BufferIngestor`], runs the
/// forward transform on a background task (never the render thread), and
/// publishes each magnitude spectrum for [`SpectrumReader`]s to snapshot.
///
/// # Lifecycle
///
/// 1. Construct with [`new`](Self::new); hand [`ingestor`](Self::ingestor)
///    to the audio callback and [`reader`](Self::reader) to the render side
/// 2. [`start`](Self::start) allocates the transform resource and spawns
///    the analysis task
/// 3. [`stop`](Self::stop) releases the resource and leaves the all-zero
///    spectrum as the final observable state
///
/// Both lifecycle calls are idempotent. Construct the pipeline once at
/// process init and pass it (or its handles) to collaborators explicitly;
/// nothing in the crate assumes a global instance.
///
/// # Example
///
/// ```ignore
/// use spectrum_stream::{AnalyzerConfig, AnalysisPipeline, SampleBuffer};
///
/// let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
/// let ingestor = pipeline.ingestor();
/// let reader = pipeline.reader();
///
/// pipeline.start()?;
/// // Audio callback, once per hardware period:
/// ingestor.submit(SampleBuffer::new(samples));
/// // Render loop, at its own cadence:
/// let magnitudes = reader.read_downsampled();
///
/// pipeline.stop().await;
/// ```
pub struct AnalysisPipeline {
    config: AnalyzerConfig,
    ingestor: BufferIngestor,
    store: SpectrumStore,
    state: Arc<PipelineState>,
    worker: Option<JoinHandle<TransformEngine>>,
}

impl AnalysisPipeline {
    /// Creates an idle pipeline with the given configuration.
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        let store = SpectrumStore::new(config.spectrum_bins, config.downsample_factor);
        Self {
            ingestor: BufferIngestor::new(),
            store,
            state: Arc::new(PipelineState {
                running: AtomicBool::new(false),
                spectra_published: AtomicU64::new(0),
            }),
            worker: None,
            config,
        }
    }

    /// Returns a handle for the audio callback to submit buffers through.
    #[must_use]
    pub fn ingestor(&self) -> BufferIngestor {
        self.ingestor.clone()
    }

    /// Returns a reader for the render side.
    #[must_use]
    pub fn reader(&self) -> SpectrumReader {
        self.store.subscribe()
    }

    /// Returns `true` while the analysis task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Returns a snapshot of the pipeline's counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            buffers_received: self.ingestor.buffers_received(),
            buffers_dropped: self.ingestor.buffers_dropped(),
            spectra_published: self.state.spectra_published.load(Ordering::SeqCst),
        }
    }

    /// Starts the pipeline.
    ///
    /// Allocates the transform resource, attaches to the ingestion stream,
    /// and spawns the analysis task. A no-op if already started. Must be
    /// called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SpectrumStreamError::TransformInit`] if the transform
    /// cannot be allocated; the pipeline stays idle and no partial state is
    /// left behind.
    pub fn start(&mut self) -> Result<(), SpectrumStreamError> {
        if self.worker.is_some() {
            return Ok(());
        }

        let mut engine = TransformEngine::new(&self.config);
        engine.create()?;

        let rx = self.ingestor.attach(self.config.queue_capacity);
        self.state.running.store(true, Ordering::SeqCst);
        self.worker = Some(spawn_analysis_worker(
            engine,
            rx,
            self.store.clone(),
            Arc::clone(&self.state),
        ));

        tracing::info!(
            frame_len = self.config.frame_len,
            spectrum_bins = self.config.spectrum_bins,
            "analysis pipeline started"
        );
        Ok(())
    }

    /// Stops the pipeline.
    ///
    /// Detaches from the ingestion stream, joins the analysis task,
    /// releases the transform resource, and publishes the all-zero
    /// spectrum. A no-op if already stopped; calling twice equals calling
    /// once.
    ///
    /// Safe to call at any time, including with a transform mid-flight:
    /// the in-flight result may still be observed, but the zeroed spectrum
    /// is published only after the task has been joined, so it is always
    /// the final observable state.
    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // Dropping the sender wakes the worker's recv() with None; the
        // cleared flag makes it skip anything still queued.
        self.state.running.store(false, Ordering::SeqCst);
        self.ingestor.detach();

        match worker.await {
            Ok(mut engine) => engine.destroy(),
            Err(e) => tracing::warn!("analysis task did not shut down cleanly: {e}"),
        }

        self.store
            .publish(MagnitudeSpectrum::zeroed(self.config.spectrum_bins));
        tracing::info!("analysis pipeline stopped");
    }
}

impl Drop for AnalysisPipeline {
    fn drop(&mut self) {
        if self.worker.is_some() {
            // Dropped without stop(): detach so the task exits on its own.
            // The store cannot be zeroed from here; prefer explicit stop().
            self.state.running.store(false, Ordering::SeqCst);
            self.ingestor.detach();
            tracing::warn!("pipeline dropped without stop()");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn wait_until<F: Fn() -> bool>(cond: F) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
        assert!(!pipeline.is_running());

        pipeline.start().unwrap();
        assert!(pipeline.is_running());
        assert!(pipeline.ingestor().is_attached());

        pipeline.stop().await;
        assert!(!pipeline.is_running());
        assert!(!pipeline.ingestor().is_attached());
    }

    #[tokio::test]
    async fn test_start_while_running_is_noop() {
        let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
        pipeline.start().unwrap();
        pipeline.start().unwrap();
        assert!(pipeline.is_running());
        pipeline.stop().await;
    }

    #[tokio::test]
    async fn test_stop_twice_is_noop() {
        let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
        pipeline.start().unwrap();
        pipeline.stop().await;
        pipeline.stop().await;
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn test_stop_when_never_started() {
        let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
        pipeline.stop().await;
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn test_failed_start_leaves_pipeline_idle() {
        let config = AnalyzerConfig {
            frame_len: 0,
            ..Default::default()
        };
        let mut pipeline = AnalysisPipeline::new(config);

        assert!(pipeline.start().is_err());
        assert!(!pipeline.is_running());
        assert!(!pipeline.ingestor().is_attached());

        // Submissions while idle are discarded, not queued.
        pipeline.ingestor().submit(SampleBuffer::new(vec![0.0; 480]));
        assert_eq!(pipeline.stats().buffers_dropped, 1);
    }

    #[tokio::test]
    async fn test_spectra_published_in_arrival_order() {
        let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
        let ingestor = pipeline.ingestor();
        let reader = pipeline.reader();
        pipeline.start().unwrap();

        // Distinct dc levels give distinct bin-0 magnitudes (level * 480).
        for (i, level) in [0.0005f32, 0.00075, 0.001].iter().enumerate() {
            ingestor.submit(SampleBuffer::new(vec![*level; 480]));
            let expected = (i + 1) as u64;
            wait_until(|| pipeline.stats().spectra_published == expected).await;

            let bin0 = reader.read().values()[0];
            assert!(
                (bin0 - level * 480.0).abs() < 1e-3,
                "buffer {i}: bin 0 was {bin0}"
            );
        }

        assert_eq!(pipeline.stats().buffers_received, 3);
        assert_eq!(pipeline.stats().buffers_dropped, 0);
        pipeline.stop().await;
    }

    #[tokio::test]
    async fn test_stream_end_leaves_stop_responsible_for_cleanup() {
        let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
        let reader = pipeline.reader();
        pipeline.start().unwrap();

        pipeline.ingestor().submit(SampleBuffer::new(vec![0.001; 480]));
        wait_until(|| pipeline.stats().spectra_published == 1).await;

        // Tearing down the stream ends the worker but does not reset the
        // store - the last spectrum stays visible until stop().
        pipeline.ingestor.detach();
        wait_until(|| !pipeline.is_running()).await;
        assert!(reader.read().values()[0] > 0.0);

        pipeline.stop().await;
        assert!(reader.read().values().iter().all(|&v| v == 0.0));
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let mut pipeline = AnalysisPipeline::new(AnalyzerConfig::default());
        let ingestor = pipeline.ingestor();
        let reader = pipeline.reader();

        pipeline.start().unwrap();
        ingestor.submit(SampleBuffer::new(vec![0.001; 480]));
        wait_until(|| pipeline.stats().spectra_published == 1).await;
        pipeline.stop().await;

        pipeline.start().unwrap();
        ingestor.submit(SampleBuffer::new(vec![0.001; 480]));
        wait_until(|| pipeline.stats().spectra_published == 2).await;
        assert!(reader.read().values()[0] > 0.0);
        pipeline.stop().await;
    }
}
