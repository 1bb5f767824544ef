//! Signal generation and transformation.
//!
//! - [`wavetable`]: reference sine tables, plus an optional WAV loader
//! - [`oscillators`]: the 16-harmonic additive oscillator bank
//! - [`effects`]: the spin rotation stereo effect

pub mod effects;
pub mod oscillators;
pub mod wavetable;

pub use effects::SpinRotation;
pub use oscillators::{HARMONICS, HarmonicOscillatorBank, Oscillator};
pub use wavetable::{WavetableError, WavetableGenerator};
