//! Core signal trait and pitch control.
//!
//! Samples are `f32`, the format audio-plugin hosts hand to the render callback.

/// Common interface for all mono sample sources.
///
/// The trait provides two operations:
/// - Single sample generation via `next_sample()`
/// - Batch processing via `process()`
pub trait Signal {
    /// Generates the next sample from the signal.
    fn next_sample(&mut self) -> f32;

    /// Fills `buffer` with consecutive samples.
    ///
    /// Default implementation calls `next_sample()` for each element.
    /// Implementors may override this for more efficient batch processing.
    fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }
}

/// Minimal trait for anything with a controllable pitch.
///
/// # Examples
///
/// ```
/// use spinsynth::{HarmonicOscillatorBank, Pitched};
///
/// let mut bank = HarmonicOscillatorBank::new(44100.0);
/// bank.set_frequency(440.0);
/// assert_eq!(bank.frequency(), 440.0);
/// ```
pub trait Pitched {
    /// Sets the frequency in Hz.
    fn set_frequency(&mut self, freq: f32);

    /// Gets the current frequency in Hz.
    fn frequency(&self) -> f32;
}
