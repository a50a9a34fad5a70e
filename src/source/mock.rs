//! Mock audio source for testing without hardware.

use std::time::Duration;

use ringbuf::traits::{Producer, Split};
use ringbuf::HeapRb;

use crate::frame::SampleBuffer;
use crate::source::frame_buffer::FrameBuffer;

/// A mock audio source that generates synthetic audio for testing.
///
/// This allows exercising the full pipeline without actual audio hardware,
/// making it suitable for CI environments. All generators are
/// deterministic.
///
/// # Example
///
/// ```
/// use spectrum_stream::MockSource;
///
/// let mut mock = MockSource::display();
///
/// // 100ms of a 440Hz sine wave
/// mock.generate_sine(440.0, 100);
///
/// // Split into analysis frames
/// let frames = mock.frames(480);
/// assert_eq!(frames.len(), 10);
/// ```
pub struct MockSource {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl MockSource {
    /// Creates a new mock source with the given sample rate.
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            samples: Vec::new(),
        }
    }

    /// Creates a mock source at the display pipeline's rate (48kHz, where
    /// one 480-sample frame covers 10ms).
    #[must_use]
    pub fn display() -> Self {
        Self::new(48000)
    }

    /// Returns the sample rate.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Generates silence for the given duration in milliseconds.
    pub fn generate_silence(&mut self, duration_ms: u64) {
        let num_samples = self.samples_for_duration(duration_ms);
        self.samples.extend(std::iter::repeat(0.0).take(num_samples));
    }

    /// Generates a sine wave at the given frequency for the given duration.
    pub fn generate_sine(&mut self, frequency: f64, duration_ms: u64) {
        let num_samples = self.samples_for_duration(duration_ms);
        let sample_rate = f64::from(self.sample_rate);

        for i in 0..num_samples {
            let t = i as f64 / sample_rate;
            let value = (2.0 * std::f64::consts::PI * frequency * t).sin();
            self.samples.push(value as f32);
        }
    }

    /// Generates white noise for the given duration.
    pub fn generate_noise(&mut self, duration_ms: u64, amplitude: f32) {
        let num_samples = self.samples_for_duration(duration_ms);

        // Simple LCG for deterministic "random" noise
        let mut seed: u32 = 12345;
        for _ in 0..num_samples {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let random = ((seed >> 16) as i32 - 32768) as f32 / 32768.0;
            self.samples.push(random * amplitude);
        }
    }

    /// Appends a single impulse sample of the given amplitude.
    ///
    /// An impulse spreads the same magnitude across every frequency bin,
    /// which makes it the easiest way to drive the clamp.
    pub fn generate_impulse(&mut self, amplitude: f32) {
        self.samples.push(amplitude);
    }

    /// Adds raw samples directly.
    pub fn add_samples(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }

    /// Takes all accumulated samples, clearing the internal buffer.
    pub fn take_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    /// Returns a reference to the accumulated samples.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the duration of accumulated samples.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// Splits the accumulated samples into sample buffers of `frame_len`.
    ///
    /// The final buffer may be shorter; the transform zero-pads it.
    #[must_use]
    pub fn frames(&self, frame_len: usize) -> Vec<SampleBuffer> {
        self.samples
            .chunks(frame_len.max(1))
            .map(|chunk| SampleBuffer::new(chunk.to_vec()))
            .collect()
    }

    /// Creates a [`FrameBuffer`] pre-filled with the accumulated samples.
    ///
    /// This is useful for testing frame assembly with mock data.
    #[must_use]
    pub fn into_frame_buffer(self, frame_len: usize) -> FrameBuffer {
        let capacity = self.samples.len().max(frame_len).max(1);
        let ring_buffer = HeapRb::<f32>::new(capacity);
        let (mut producer, consumer) = ring_buffer.split();

        for sample in self.samples {
            let _ = producer.try_push(sample);
        }

        FrameBuffer::new(consumer, frame_len)
    }

    fn samples_for_duration(&self, duration_ms: u64) -> usize {
        (u64::from(self.sample_rate) * duration_ms / 1000) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_silence() {
        let mut mock = MockSource::display();
        mock.generate_silence(100);

        let samples = mock.take_samples();
        assert_eq!(samples.len(), 4800); // 48000 * 0.1
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_mock_source_sine() {
        let mut mock = MockSource::display();
        mock.generate_sine(440.0, 100);

        let samples = mock.take_samples();
        assert_eq!(samples.len(), 4800);

        // Sine wave should have positive and negative values
        assert!(samples.iter().any(|&s| s > 0.0));
        assert!(samples.iter().any(|&s| s < 0.0));
    }

    #[test]
    fn test_mock_source_noise_is_deterministic() {
        let mut a = MockSource::display();
        let mut b = MockSource::display();
        a.generate_noise(50, 0.5);
        b.generate_noise(50, 0.5);
        assert_eq!(a.take_samples(), b.take_samples());
    }

    #[test]
    fn test_mock_source_duration() {
        let mut mock = MockSource::display();
        mock.generate_silence(500);
        assert_eq!(mock.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_frames_split() {
        let mut mock = MockSource::display();
        mock.generate_silence(25); // 1200 samples

        let frames = mock.frames(480);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].len(), 480);
        assert_eq!(frames[2].len(), 240);
    }

    #[test]
    fn test_into_frame_buffer() {
        let mut mock = MockSource::display();
        mock.add_samples(&[1.0, 2.0, 3.0, 4.0]);

        let mut buffer = mock.into_frame_buffer(2);
        assert_eq!(buffer.try_read_frame().unwrap().samples(), &[1.0, 2.0]);
        assert_eq!(buffer.try_read_frame().unwrap().samples(), &[3.0, 4.0]);
        assert!(buffer.try_read_frame().is_none());
    }

    #[test]
    fn test_impulse() {
        let mut mock = MockSource::display();
        mock.generate_silence(5);
        mock.generate_impulse(4.0);

        let samples = mock.take_samples();
        assert_eq!(samples[samples.len() - 1], 4.0);
    }
}
