//! Frequency type for converting MIDI notes to pitch.

/// A frequency value in Hz.
///
/// Built either from Hz directly or from a MIDI note number using twelve-tone
/// equal temperament with A4 (note 69) at 440 Hz.
///
/// # Examples
///
/// ```
/// use spinsynth::music::frequency::Frequency;
///
/// let freq: Frequency = 440.0.into();
/// assert_eq!(freq.as_f64(), 440.0);
///
/// let freq: Frequency = 69u8.into();
/// assert!((freq.as_f32() - 440.0).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequency(f64);

/// MIDI note number of the tuning reference.
pub const A4_MIDI: u8 = 69;

/// Pitch of the tuning reference in Hz.
pub const A4_HZ: f64 = 440.0;

impl Frequency {
    pub fn from_hz(hz: f64) -> Self {
        Frequency(hz)
    }

    /// Creates a frequency from a MIDI note number (0-127).
    ///
    /// ```
    /// use spinsynth::music::frequency::Frequency;
    ///
    /// let freq = Frequency::from_midi(57); // A3
    /// assert!((freq.as_f64() - 220.0).abs() < 0.01);
    /// ```
    pub fn from_midi(midi_note: u8) -> Self {
        // f = 440 * 2^((n - 69) / 12)
        let semitones = f64::from(midi_note) - f64::from(A4_MIDI);
        Frequency(A4_HZ * 2.0_f64.powf(semitones / 12.0))
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    pub fn as_f32(&self) -> f32 {
        self.0 as f32
    }
}

impl From<f64> for Frequency {
    fn from(hz: f64) -> Self {
        Frequency::from_hz(hz)
    }
}

impl From<u8> for Frequency {
    fn from(midi_note: u8) -> Self {
        Frequency::from_midi(midi_note)
    }
}
