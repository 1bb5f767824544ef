//! Voice - one note of the additive engine.
//!
//! A voice owns a harmonic oscillator bank, an ADSR envelope and a spin rotation
//! effect. Per block it synthesizes mono samples, duplicates them into a stereo
//! pair, rotates the pair and mixes the result into the host buffer, scaled by the
//! envelope and a fixed voice gain.
//!
//! The rotation effect returns up to three frames more or fewer than it was given.
//! To keep every block exactly `num_samples` long, the voice runs the rotated
//! stream [`ROTATION_LATENCY`] frames late: three silent frames are queued when a
//! note starts, and whatever the effect produces beyond the block is held for the
//! next one. The queue plus the effect's carry always hold exactly three frames.

use super::adsr::ADSR;
use super::envelope::Envelope;
use super::frequency::Frequency;
use super::params::ParameterSnapshot;
use crate::config::EngineConfig;
use crate::core::{Pitched, Signal};
use crate::synthesis::effects::{MAX_CARRY, SpinRotation};
use crate::synthesis::oscillators::{HarmonicOscillatorBank, Oscillator};
use crate::synthesis::wavetable::WavetableGenerator;

/// Fixed output gain applied to every voice.
pub const VOICE_GAIN: f32 = 0.1;

/// Envelope level at or below which a releasing voice stops.
pub const RELEASE_THRESHOLD: f32 = 0.005;

/// Multiplier applied to the configured attack time.
pub const ATTACK_SCALE: f32 = 2.0;

/// Multiplier applied to the configured release time.
pub const RELEASE_SCALE: f32 = 3.0;

/// Frames by which a voice's output trails its oscillator.
pub const ROTATION_LATENCY: usize = MAX_CARRY;

/// Lifecycle of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Playing,
    Releasing,
}

/// A single synthesizer voice.
///
/// # Examples
///
/// ```
/// use spinsynth::{EngineConfig, ParameterSnapshot, Voice};
///
/// let mut voice = Voice::new(&EngineConfig::default());
/// voice.apply_parameters(&ParameterSnapshot::default());
/// voice.start_note(69, 1.0);
///
/// let mut left = vec![0.0; 256];
/// let mut right = vec![0.0; 256];
/// voice.render(&mut [&mut left[..], &mut right[..]], 0, 256);
/// assert!(left.iter().any(|s| *s != 0.0));
///
/// voice.stop_note(false);
/// assert!(!voice.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    bank: HarmonicOscillatorBank,
    envelope: ADSR,
    rotation: SpinRotation,
    state: VoiceState,
    note: Option<u8>,
    velocity: f32,

    mono: Vec<f32>,
    rotated_left: Vec<f32>,
    rotated_right: Vec<f32>,

    // Rotated frames produced but not yet written, oldest first
    pending_left: [f32; ROTATION_LATENCY],
    pending_right: [f32; ROTATION_LATENCY],
    pending_len: usize,
}

impl Voice {
    /// Creates an idle voice with a generated reference sine.
    pub fn new(config: &EngineConfig) -> Self {
        let generator = WavetableGenerator::default()
            .with_scaling_factor(config.table_scaling)
            .with_reference_frequency(config.reference_frequency);
        let bank = HarmonicOscillatorBank::with_generator(generator, config.sample_rate);
        Self::with_bank(bank, config.max_block_size)
    }

    /// Creates an idle voice around an existing oscillator bank.
    pub fn with_bank(bank: HarmonicOscillatorBank, max_block_size: usize) -> Self {
        let defaults = ParameterSnapshot::default();
        let envelope = ADSR::new(
            defaults.attack * ATTACK_SCALE,
            defaults.decay,
            defaults.sustain,
            defaults.release * RELEASE_SCALE,
            bank.sample_rate(),
        );

        let mut voice = Self {
            bank,
            envelope,
            rotation: SpinRotation::new(),
            state: VoiceState::Idle,
            note: None,
            velocity: 0.0,
            mono: Vec::new(),
            rotated_left: Vec::new(),
            rotated_right: Vec::new(),
            pending_left: [0.0; ROTATION_LATENCY],
            pending_right: [0.0; ROTATION_LATENCY],
            pending_len: 0,
        };
        voice.reserve(max_block_size);
        voice
    }

    /// Sets the sample rate and sizes the scratch buffers for `max_block_size`.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.set_sample_rate(sample_rate);
        self.reserve(max_block_size);
    }

    /// Changes the sample rate.
    ///
    /// Regenerates the reference table, resets oscillator phases and drops any
    /// rotation carry. A sounding note keeps its envelope position.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.bank.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
        self.rotation.clear_buffer();
        self.queue_latency();
    }

    /// Copies one block's parameters into the voice.
    pub fn apply_parameters(&mut self, params: &ParameterSnapshot) {
        self.envelope.set_parameters(
            params.attack * ATTACK_SCALE,
            params.decay,
            params.sustain,
            params.release * RELEASE_SCALE,
        );
        self.bank.set_harm_gains(&params.harmonic_gains);
        self.rotation.set_angles(params.phi, params.theta);
    }

    /// Starts `note` from the beginning of its attack.
    pub fn start_note(&mut self, note: u8, velocity: f32) {
        self.bank.reset();
        self.bank.set_frequency(Frequency::from_midi(note).as_f32());
        self.rotation.clear_buffer();
        self.queue_latency();
        self.envelope.reset();
        self.envelope.trigger(velocity);
        self.note = Some(note);
        self.velocity = velocity;
        self.state = VoiceState::Playing;
    }

    /// Ends the current note.
    ///
    /// With `allow_tail_off` a playing voice enters its release phase. Without it
    /// the voice goes idle at once and drops any pending output.
    pub fn stop_note(&mut self, allow_tail_off: bool) {
        if !allow_tail_off {
            self.clear_current_note();
        } else if self.state == VoiceState::Playing {
            self.envelope.release();
            self.state = VoiceState::Releasing;
        }
    }

    /// Adds `num_samples` frames into `output[..][start..start + num_samples]`.
    ///
    /// The first channel receives the left signal and the second the right one;
    /// further channels are left alone. With no channels the voice still advances,
    /// so its envelope and latency queue stay in step with the host. Blocks larger
    /// than the prepared size are rendered in prepared-size pieces. Idle voices
    /// write nothing.
    pub fn render(&mut self, output: &mut [&mut [f32]], start: usize, num_samples: usize) {
        if self.state == VoiceState::Idle || num_samples == 0 {
            return;
        }

        let chunk = self.mono.len();
        if num_samples > chunk {
            log::debug!(
                "block of {} samples exceeds prepared size {}, rendering in pieces",
                num_samples,
                chunk
            );
        }

        let mut offset = 0;
        while offset < num_samples && self.state != VoiceState::Idle {
            let n = (num_samples - offset).min(chunk);
            self.render_chunk(output, start + offset, n);
            offset += n;
        }
    }

    /// Renders at most the prepared block size.
    fn render_chunk(&mut self, output: &mut [&mut [f32]], start: usize, num_samples: usize) {
        Signal::process(&mut self.bank, &mut self.mono[..num_samples]);

        let queued = self.pending_len;
        self.rotated_left[..queued].copy_from_slice(&self.pending_left[..queued]);
        self.rotated_right[..queued].copy_from_slice(&self.pending_right[..queued]);
        let mono = &self.mono[..num_samples];
        let produced = self.rotation.spin_rotate(
            mono,
            mono,
            &mut self.rotated_left[queued..],
            &mut self.rotated_right[queued..],
        );
        let available = queued + produced;
        debug_assert!(available >= num_samples);

        let (mut left_out, mut right_out): (Option<&mut [f32]>, Option<&mut [f32]>) =
            match output {
                [] => (None, None),
                [left] => (Some(&mut **left), None),
                [left, right, ..] => (Some(&mut **left), Some(&mut **right)),
            };

        for i in 0..num_samples {
            let env = self.envelope.next_sample();
            if self.state == VoiceState::Releasing && env <= RELEASE_THRESHOLD {
                self.clear_current_note();
                return;
            }

            let scale = VOICE_GAIN * env;
            if let Some(left_out) = left_out.as_deref_mut() {
                left_out[start + i] += self.rotated_left[i] * scale;
            }
            if let Some(right_out) = right_out.as_deref_mut() {
                right_out[start + i] += self.rotated_right[i] * scale;
            }
        }

        let leftover = available - num_samples;
        self.pending_left[..leftover].copy_from_slice(&self.rotated_left[num_samples..available]);
        self.pending_right[..leftover]
            .copy_from_slice(&self.rotated_right[num_samples..available]);
        self.pending_len = leftover;
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Note held by this voice, if any.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_active(&self) -> bool {
        self.state != VoiceState::Idle
    }

    pub fn is_releasing(&self) -> bool {
        self.state == VoiceState::Releasing
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn bank(&self) -> &HarmonicOscillatorBank {
        &self.bank
    }

    pub fn rotation(&self) -> &SpinRotation {
        &self.rotation
    }

    fn clear_current_note(&mut self) {
        self.state = VoiceState::Idle;
        self.note = None;
        self.envelope.reset();
        self.bank.reset();
        self.rotation.clear_buffer();
        self.pending_len = 0;
    }

    fn queue_latency(&mut self) {
        self.pending_left = [0.0; ROTATION_LATENCY];
        self.pending_right = [0.0; ROTATION_LATENCY];
        self.pending_len = ROTATION_LATENCY;
    }

    fn reserve(&mut self, block_size: usize) {
        let block_size = block_size.max(1);
        if block_size > self.mono.len() {
            self.mono.resize(block_size, 0.0);
            // room for the queued frames plus the effect's longest output
            self.rotated_left.resize(block_size + 2 * MAX_CARRY, 0.0);
            self.rotated_right.resize(block_size + 2 * MAX_CARRY, 0.0);
        }
    }
}
