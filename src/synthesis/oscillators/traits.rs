//! Core trait definitions for oscillators.

use crate::core::{Pitched, Signal};

/// Oscillators are pitched signals with resettable phase.
///
/// Voices reset their oscillator on every note-on so that each note starts from
/// the same phase.
pub trait Oscillator: Signal + Pitched {
    /// Resets the oscillator phase to zero.
    fn reset(&mut self);
}
