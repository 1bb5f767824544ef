//! Spinsynth - a polyphonic additive synthesizer engine
//!
//! Each voice sums 16 harmonics read from one reference sine table, shapes them
//! with an ADSR envelope and spreads the result across the stereo field with a
//! spin rotation: stereo pairs are packed into complex numbers and transformed four
//! at a time by a matrix built from the spin-3/2 operators.
//!
//! The host drives a [`VoicePool`] once per audio block with a
//! [`ParameterSnapshot`] and the block's [`MidiEvent`]s. Rendering adds into the
//! host's buffer and does not allocate once the pool is prepared.
//!
//! # Examples
//!
//! ```
//! use spinsynth::{EngineConfig, MidiEvent, ParameterSnapshot, VoicePool};
//!
//! let config = EngineConfig::default().with_sample_rate(48000.0);
//! config.validate()?;
//!
//! let mut pool: VoicePool = VoicePool::new(config);
//! let params = ParameterSnapshot::default().with_angles(0.5, 1.0);
//!
//! let mut left = vec![0.0_f32; 256];
//! let mut right = vec![0.0_f32; 256];
//! pool.render_block(
//!     &mut [&mut left[..], &mut right[..]],
//!     0,
//!     256,
//!     &[MidiEvent::note_on(69, 1.0)],
//!     &params,
//! );
//! # Ok::<(), spinsynth::ConfigError>(())
//! ```
//!
//! # Features
//!
//! - `macros` (default): the [`note!`] macro for compile-time note names
//! - `wavetable-loader`: load a reference table from a WAV file with `hound`

pub mod config;
pub mod core;
pub mod music;
pub mod synthesis;

pub use config::{ConfigError, EngineConfig};
pub use crate::core::{Pitched, Signal};
pub use music::{
    ADSR, Envelope, MidiEvent, ParameterId, ParameterSnapshot, StealingStrategy, Voice,
    VoicePool, VoiceState,
};
pub use synthesis::{
    HARMONICS, HarmonicOscillatorBank, Oscillator, SpinRotation, WavetableError,
    WavetableGenerator,
};

#[cfg(feature = "macros")]
pub use spinsynth_macros::note;
