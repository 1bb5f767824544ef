//! Additive oscillator bank reading 16 harmonics from one reference table.
//!
//! # Design Overview
//!
//! The bank owns a single reference table (one second of a sine at the reference
//! frequency, see [`WavetableGenerator`]) and 16 phase accumulators. Harmonic `k`
//! steps through the table `k + 1` times faster than the fundamental, so with a pure
//! sine table it sounds the `(k + 1)`-th partial.
//!
//! Per output sample:
//!
//! 1. Each harmonic reads the table at its accumulator with linear interpolation
//!    between the two bracketing entries (wrapping at the end of the table)
//! 2. The value is weighted by the harmonic's gain
//! 3. The accumulator advances by `table_len / sample_rate * playing_factor * (k + 1)`
//!    and is wrapped back into the table
//! 4. The 16 weighted values are summed and divided by 16
//!
//! The division by 16 is a fixed normalization, independent of how many gains are
//! non-zero.
//!
//! `process` writes into a caller-provided slice and never allocates, so it can run
//! on the audio thread.

use super::Oscillator;
use crate::core::{Pitched, Signal};
use crate::music::frequency::Frequency;
use crate::synthesis::wavetable::WavetableGenerator;

/// Number of harmonics summed by each bank.
pub const HARMONICS: usize = 16;

/// Per-voice additive generator.
///
/// # Examples
///
/// ```
/// use spinsynth::HarmonicOscillatorBank;
///
/// let mut bank = HarmonicOscillatorBank::new(44100.0);
/// bank.set_harm_gain(1, 0.5);
///
/// // A4, with the default 1 Hz reference table
/// let samples = bank.process_vec(64, 440.0);
/// assert_eq!(samples.len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct HarmonicOscillatorBank {
    table: Vec<f32>,
    generator: WavetableGenerator,
    /// Set when the table was supplied by the caller and must survive rate changes
    custom_table: bool,
    reference_frequency: f32,
    sample_rate: f32,
    /// Target pitch used by the `Signal` impl
    frequency: f32,
    positions: [f64; HARMONICS],
    gains: [f32; HARMONICS],
}

impl HarmonicOscillatorBank {
    /// Creates a bank with a unit-amplitude 1 Hz reference sine at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_generator(WavetableGenerator::default(), sample_rate)
    }

    /// Creates a bank whose reference table comes from `generator`, regenerated at
    /// `sample_rate`.
    pub fn with_generator(mut generator: WavetableGenerator, sample_rate: f32) -> Self {
        generator.set_sample_rate(table_rate(sample_rate));
        let reference_frequency = generator.reference_frequency();
        Self::build(generator.generate(), generator, false, reference_frequency, sample_rate)
    }

    /// Creates a bank over an arbitrary reference table.
    ///
    /// The table is kept as-is across sample-rate changes.
    ///
    /// # Panics
    ///
    /// Panics if `table` is empty.
    pub fn from_table(table: Vec<f32>, reference_frequency: f32, sample_rate: f32) -> Self {
        assert!(!table.is_empty(), "reference table must not be empty");
        let generator = WavetableGenerator::new(table_rate(sample_rate), 1.0, reference_frequency);
        Self::build(table, generator, true, reference_frequency, sample_rate)
    }

    fn build(
        table: Vec<f32>,
        generator: WavetableGenerator,
        custom_table: bool,
        reference_frequency: f32,
        sample_rate: f32,
    ) -> Self {
        let mut gains = [0.0; HARMONICS];
        gains[0] = 1.0;
        Self {
            table,
            generator,
            custom_table,
            reference_frequency,
            sample_rate,
            frequency: reference_frequency,
            positions: [0.0; HARMONICS],
            gains,
        }
    }

    /// Synthesizes `out.len()` samples at `playing_factor` times the reference pitch.
    pub fn process(&mut self, out: &mut [f32], playing_factor: f32) {
        let step = self.base_step(playing_factor);
        for sample in out.iter_mut() {
            *sample = self.tick(step);
        }
    }

    /// Synthesizes samples at `frequency`, relative to the table's `reference_frequency`.
    pub fn process_frequency(&mut self, out: &mut [f32], frequency: f32, reference_frequency: f32) {
        self.process(out, frequency / reference_frequency);
    }

    /// Synthesizes samples for a MIDI note (A4 = note 69 = 440 Hz).
    pub fn process_midi(&mut self, out: &mut [f32], reference_frequency: f32, midi_note: u8) {
        let frequency = Frequency::from_midi(midi_note).as_f32();
        self.process_frequency(out, frequency, reference_frequency);
    }

    /// Allocating variant of [`process`](Self::process); returns exactly `no_samples`
    /// values. Not meant for the audio thread.
    pub fn process_vec(&mut self, no_samples: usize, playing_factor: f32) -> Vec<f32> {
        let mut out = vec![0.0; no_samples];
        self.process(&mut out, playing_factor);
        out
    }

    /// Zeroes all phase accumulators.
    pub fn reset_pos(&mut self) {
        self.positions = [0.0; HARMONICS];
    }

    /// Changes the playback rate and resets the phases.
    ///
    /// A generated reference table is rebuilt at the new rate so that its length
    /// keeps matching one second of audio.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        if !self.custom_table {
            self.generator.set_sample_rate(table_rate(sample_rate));
            self.table = self.generator.generate();
        }
        self.reset_pos();
    }

    /// Sets the gain of one harmonic.
    ///
    /// `value` is not validated; values outside [0, 1] give well-defined but
    /// unusual output.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 16`.
    pub fn set_harm_gain(&mut self, index: usize, value: f32) {
        self.gains[index] = value;
    }

    /// Returns the gain of one harmonic.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 16`.
    pub fn harm_gain(&self, index: usize) -> f32 {
        self.gains[index]
    }

    pub fn set_harm_gains(&mut self, gains: &[f32; HARMONICS]) {
        self.gains = *gains;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn reference_frequency(&self) -> f32 {
        self.reference_frequency
    }

    pub fn table(&self) -> &[f32] {
        &self.table
    }

    fn base_step(&self, playing_factor: f32) -> f64 {
        self.table.len() as f64 / f64::from(self.sample_rate) * f64::from(playing_factor)
    }

    fn tick(&mut self, step: f64) -> f32 {
        let len = self.table.len();
        let len_f = len as f64;
        let mut sum = 0.0;

        for (harm, (pos, gain)) in self.positions.iter_mut().zip(self.gains.iter()).enumerate() {
            let floor = pos.floor();
            let frac = (*pos - floor) as f32;
            let i0 = floor as usize % len;
            let i1 = (i0 + 1) % len;
            let (s0, s1) = (self.table[i0], self.table[i1]);
            sum += (s0 + (s1 - s0) * frac) * gain;

            *pos = (*pos + step * (harm + 1) as f64).rem_euclid(len_f);
            // rem_euclid of a tiny negative value rounds up to len_f
            if *pos >= len_f {
                *pos = 0.0;
            }
        }

        sum / HARMONICS as f32
    }
}

fn table_rate(sample_rate: f32) -> u32 {
    sample_rate.round().max(1.0) as u32
}

impl Signal for HarmonicOscillatorBank {
    fn next_sample(&mut self) -> f32 {
        let step = self.base_step(self.frequency / self.reference_frequency);
        self.tick(step)
    }

    fn process(&mut self, buffer: &mut [f32]) {
        let playing_factor = self.frequency / self.reference_frequency;
        HarmonicOscillatorBank::process(self, buffer, playing_factor);
    }
}

impl Pitched for HarmonicOscillatorBank {
    fn set_frequency(&mut self, freq: f32) {
        self.frequency = freq;
    }

    fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl Oscillator for HarmonicOscillatorBank {
    fn reset(&mut self) {
        self.reset_pos();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SAMPLE_RATE: f32 = 44100.0;

    #[test]
    fn test_default_gains() {
        let bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        assert_eq!(bank.harm_gain(0), 1.0);
        for k in 1..HARMONICS {
            assert_eq!(bank.harm_gain(k), 0.0);
        }
    }

    #[test]
    fn test_output_length() {
        let mut bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        for n in [1, 2, 3, 7, 64, 511, 4096] {
            assert_eq!(bank.process_vec(n, 440.0).len(), n);
        }
    }

    #[test]
    fn test_unit_factor_reproduces_table() {
        let mut bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        bank.reset_pos();
        let out = bank.process_vec(2000, 1.0);
        for (i, sample) in out.iter().enumerate() {
            assert_eq!(*sample, bank.table()[i] / HARMONICS as f32);
        }
    }

    #[test]
    fn test_linear_interpolation() {
        // table of 4 samples at "sample rate" 8: step of 0.5 per sample
        let mut bank = HarmonicOscillatorBank::from_table(vec![0.0, 1.0, 0.0, -1.0], 1.0, 8.0);
        let out = bank.process_vec(8, 1.0);
        let expected = [0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5];
        for (sample, want) in out.iter().zip(expected) {
            assert_abs_diff_eq!(*sample * HARMONICS as f32, want, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_interpolation_wraps_at_table_end() {
        let mut bank = HarmonicOscillatorBank::from_table(vec![2.0, 0.0, 0.0, 4.0], 1.0, 8.0);
        bank.process_vec(7, 1.0);
        // position 3.5: halfway between the last entry and the first
        let sample = bank.process_vec(1, 1.0)[0];
        assert_abs_diff_eq!(sample * HARMONICS as f32, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_second_harmonic_runs_twice_as_fast() {
        let mut fundamental = HarmonicOscillatorBank::new(SAMPLE_RATE);
        let mut second = HarmonicOscillatorBank::new(SAMPLE_RATE);
        second.set_harm_gain(0, 0.0);
        second.set_harm_gain(1, 1.0);

        let a = fundamental.process_vec(512, 880.0);
        let b = second.process_vec(512, 440.0);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_fixed_normalization() {
        let mut bank = HarmonicOscillatorBank::from_table(vec![1.0; 8], 1.0, 8.0);
        bank.set_harm_gains(&[1.0; HARMONICS]);
        let out = bank.process_vec(4, 1.0);
        assert!(out.iter().all(|s| (*s - 1.0).abs() < 1e-6));

        bank.set_harm_gains(&[0.0; HARMONICS]);
        bank.set_harm_gain(3, 1.0);
        let out = bank.process_vec(4, 1.0);
        assert!(out.iter().all(|s| (*s - 1.0 / 16.0).abs() < 1e-6));
    }

    #[test]
    fn test_accumulators_stay_in_table() {
        let mut bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        bank.set_harm_gains(&[1.0; HARMONICS]);
        bank.process_vec(10_000, 12543.85);
        let len = bank.table().len() as f64;
        assert!(bank.positions.iter().all(|p| (0.0..len).contains(p)));
    }

    #[test]
    fn test_tiny_negative_step_wraps_below_table_length() {
        let mut bank = HarmonicOscillatorBank::from_table(vec![0.0, 1.0, 0.0, -1.0], 1.0, 8.0);
        bank.process_vec(1, -2e-20);
        assert!(bank.positions.iter().all(|p| (0.0..4.0).contains(p)));
        assert_eq!(bank.positions[0], 0.0);
    }

    #[test]
    fn test_reset_pos_restarts_waveform() {
        let mut bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        let first = bank.process_vec(100, 261.63);
        bank.process_vec(333, 261.63);
        bank.reset_pos();
        let again = bank.process_vec(100, 261.63);
        assert_eq!(first, again);
    }

    #[test]
    fn test_midi_matches_frequency() {
        let mut by_note = HarmonicOscillatorBank::new(SAMPLE_RATE);
        let mut by_freq = HarmonicOscillatorBank::new(SAMPLE_RATE);
        let mut a = [0.0; 256];
        let mut b = [0.0; 256];
        by_note.process_midi(&mut a, 1.0, 69);
        by_freq.process_frequency(&mut b, 440.0, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_rate_change_regenerates_table() {
        let mut bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        bank.process_vec(10, 440.0);
        bank.set_sample_rate(48000.0);
        assert_eq!(bank.table().len(), 48000);
        assert!(bank.positions.iter().all(|p| *p == 0.0));
    }

    #[test]
    fn test_custom_table_survives_rate_change() {
        let mut bank = HarmonicOscillatorBank::from_table(vec![0.0, 1.0, 0.0, -1.0], 1.0, 8.0);
        bank.set_sample_rate(16.0);
        assert_eq!(bank.table(), &[0.0, 1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_signal_impl_uses_target_frequency() {
        let mut bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        bank.set_frequency(440.0);
        let mut via_signal = [0.0; 64];
        Signal::process(&mut bank, &mut via_signal);

        let mut direct = HarmonicOscillatorBank::new(SAMPLE_RATE);
        assert_eq!(via_signal.to_vec(), direct.process_vec(64, 440.0));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_harmonic_panics() {
        let mut bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        bank.set_harm_gain(HARMONICS, 1.0);
    }
}
