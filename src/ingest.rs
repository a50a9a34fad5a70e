//! Bridges the push-based audio callback into the pipeline's pull-based
//! stream.
//!
//! The audio source calls [`BufferIngestor::submit`] (or one of the
//! interleaved adapters) from its own thread, once per hardware period.
//! That thread may run at real-time priority, so the callback path never
//! blocks and never allocates beyond the buffer it was handed: delivery is
//! a `try_lock` plus a `try_send` into a bounded channel. When the queue is
//! full or no consumer is attached, the newest buffer is dropped -
//! protecting the audio thread is worth more than completeness of analysis.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::frame::SampleBuffer;

/// Delivery counters shared between ingestor handles and the pipeline.
#[derive(Debug, Default)]
pub(crate) struct IngestCounters {
    pub received: AtomicU64,
    pub dropped: AtomicU64,
}

/// Receives sample buffers from the audio callback and forwards them into
/// the bounded analysis stream.
///
/// Cloning yields another handle to the same stream; hand a clone to the
/// audio callback and keep the pipeline's own handle for attachment.
/// The stream supports exactly one active consumer: attaching a new one
/// replaces (and wakes out) any previous attachment.
#[derive(Clone)]
pub struct BufferIngestor {
    slot: Arc<Mutex<Option<mpsc::Sender<SampleBuffer>>>>,
    counters: Arc<IngestCounters>,
}

impl BufferIngestor {
    /// Creates an ingestor with no consumer attached.
    ///
    /// Buffers submitted before a pipeline attaches are discarded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            counters: Arc::new(IngestCounters::default()),
        }
    }

    /// Enqueues a buffer for analysis.
    ///
    /// Never blocks the caller: with no consumer attached, a contended
    /// slot, or a full queue, the buffer is dropped and counted. Empty
    /// buffers are dropped silently. Safe to call from a real-time audio
    /// thread - no logging, no unbounded waits.
    pub fn submit(&self, buffer: SampleBuffer) {
        if buffer.is_empty() {
            return;
        }

        // try_lock keeps the callback wait-free; contention only occurs for
        // the brief instant a consumer is being attached or detached.
        let Some(guard) = self.slot.try_lock() else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        match guard.as_ref() {
            Some(tx) => {
                if tx.try_send(buffer).is_ok() {
                    self.counters.received.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
            None => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Adapts an interleaved multi-channel f32 PCM buffer and submits it.
    ///
    /// Selects the first channel. Zero-length or zero-channel deliveries
    /// are no-ops.
    pub fn render_interleaved(&self, data: &[f32], channels: u16) {
        self.submit(SampleBuffer::from_interleaved(data, channels));
    }

    /// Adapts an interleaved multi-channel i16 PCM buffer and submits it.
    ///
    /// Selects the first channel and converts it to f32. Zero-length or
    /// zero-channel deliveries are no-ops.
    pub fn render_interleaved_i16(&self, data: &[i16], channels: u16) {
        self.submit(SampleBuffer::from_interleaved_i16(data, channels));
    }

    /// Returns `true` if a consumer is currently attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Total buffers forwarded to the analysis stream.
    #[must_use]
    pub fn buffers_received(&self) -> u64 {
        self.counters.received.load(Ordering::Relaxed)
    }

    /// Total buffers dropped (no consumer, full queue, or contended slot).
    #[must_use]
    pub fn buffers_dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// Attaches a consumer, replacing any previous attachment.
    ///
    /// The previous consumer's channel loses its sender and drains to
    /// completion.
    pub(crate) fn attach(&self, capacity: usize) -> mpsc::Receiver<SampleBuffer> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        if self.slot.lock().replace(tx).is_some() {
            tracing::debug!("replacing previously attached consumer");
        }
        rx
    }

    /// Detaches the current consumer, if any.
    ///
    /// Dropping the sender wakes a consumer parked on `recv()` with `None`.
    pub(crate) fn detach(&self) {
        self.slot.lock().take();
    }
}

impl Default for BufferIngestor {
    fn default() -> Self {
        Self::new()
    }
}
