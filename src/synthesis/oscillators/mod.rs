//! Oscillator implementations for audio synthesis.

mod harmonic;
mod traits;

pub use harmonic::{HARMONICS, HarmonicOscillatorBank};
pub use traits::Oscillator;
