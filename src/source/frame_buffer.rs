//! Ring buffer wrapper that assembles fixed-length analysis frames.

use ringbuf::traits::{Consumer, Observer, Split};
use ringbuf::HeapRb;

use crate::frame::SampleBuffer;

/// Assembles exact-length frames from a stream of raw samples.
///
/// The producer half of the ring buffer lives in the audio callback, which
/// pushes whatever sample count the hardware period produced. This wraps
/// the consumer half to yield [`SampleBuffer`]s of exactly `frame_len`
/// samples, so device callbacks of arbitrary size feed fixed-size analysis
/// frames without per-callback padding.
pub struct FrameBuffer {
    consumer: ringbuf::HeapCons<f32>,
    frame_len: usize,
}

impl FrameBuffer {
    /// Creates a frame buffer from a ring buffer consumer.
    #[must_use]
    pub fn new(consumer: ringbuf::HeapCons<f32>, frame_len: usize) -> Self {
        Self {
            consumer,
            frame_len,
        }
    }

    /// Attempts to read a complete frame from the buffer.
    ///
    /// Returns `None` if fewer than `frame_len` samples are available.
    pub fn try_read_frame(&mut self) -> Option<SampleBuffer> {
        if self.consumer.occupied_len() < self.frame_len {
            return None;
        }

        let mut samples = Vec::with_capacity(self.frame_len);
        for _ in 0..self.frame_len {
            if let Some(sample) = self.consumer.try_pop() {
                samples.push(sample);
            } else {
                break;
            }
        }

        if samples.is_empty() {
            return None;
        }

        Some(SampleBuffer::new(samples))
    }

    /// Returns the number of samples currently in the buffer.
    #[must_use]
    pub fn available(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Returns `true` if enough samples are available for a complete frame.
    #[must_use]
    pub fn has_frame(&self) -> bool {
        self.available() >= self.frame_len
    }

    /// Drains all remaining samples from the buffer.
    ///
    /// Returns frames until the buffer is empty. The last frame may be
    /// shorter than `frame_len`; the transform zero-pads it.
    pub fn drain(&mut self) -> Vec<SampleBuffer> {
        let mut frames = Vec::new();

        while self.has_frame() {
            if let Some(frame) = self.try_read_frame() {
                frames.push(frame);
            }
        }

        let mut remainder = Vec::new();
        while let Some(sample) = self.consumer.try_pop() {
            remainder.push(sample);
        }
        if !remainder.is_empty() {
            frames.push(SampleBuffer::new(remainder));
        }

        frames
    }
}

/// Creates a ring buffer pair for frame assembly.
///
/// Returns a producer (for the audio callback) and a [`FrameBuffer`] (for
/// the bridge task feeding the ingestor).
#[must_use]
pub fn create_frame_buffer(
    capacity: usize,
    frame_len: usize,
) -> (ringbuf::HeapProd<f32>, FrameBuffer) {
    let ring_buffer = HeapRb::<f32>::new(capacity.max(frame_len));
    let (producer, consumer) = ring_buffer.split();

    (producer, FrameBuffer::new(consumer, frame_len))
}
