//! Fixed-capacity polyphonic voice pool.
//!
//! # Design Overview
//!
//! `VoicePool` owns `VOICES` voices (8 by default), built once from an
//! [`EngineConfig`]. Each block the host hands it a parameter snapshot, the note
//! events for that block and an output buffer:
//!
//! 1. The snapshot is written into every voice, idle ones included
//! 2. Events are dispatched in order
//! 3. Every active voice adds its output into the buffer
//!
//! ## Voice Allocation
//!
//! A note-on first releases any voice still holding the same note, then takes the
//! first idle voice. When none is idle, the [`StealingStrategy`] picks a victim:
//!
//! - **Released** (default): the oldest voice in its release phase, else the oldest
//! - **Oldest**: the voice started longest ago
//! - **Quietest**: the voice with the lowest envelope level
//! - **None**: the new note is dropped
//!
//! A stolen voice is hard-stopped and restarted with the new note.
//!
//! ## Implementation Notes
//!
//! - Voices live in a fixed array; rendering never allocates once prepared
//! - Age counter wraps at u64::MAX
//! - Nothing fallible runs while rendering

use super::events::MidiEvent;
use super::params::ParameterSnapshot;
use super::voice::Voice;
use crate::config::EngineConfig;

/// Default number of simultaneous voices.
pub const DEFAULT_VOICES: usize = 8;

/// Voice stealing strategy for when all voices are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StealingStrategy {
    /// Steal the voice that was triggered longest ago.
    Oldest,
    /// Steal the voice with the lowest envelope level.
    Quietest,
    /// Prefer stealing voices in release phase, then fall back to Oldest.
    #[default]
    Released,
    /// Never steal; drop the incoming note.
    None,
}

#[derive(Debug, Clone)]
struct VoiceSlot {
    voice: Voice,
    age: u64,
}

/// Polyphonic voice pool.
///
/// # Examples
///
/// ```
/// use spinsynth::{EngineConfig, MidiEvent, ParameterSnapshot, VoicePool};
///
/// let mut pool: VoicePool = VoicePool::new(EngineConfig::default());
/// let params = ParameterSnapshot::default();
///
/// let mut left = vec![0.0; 512];
/// let mut right = vec![0.0; 512];
/// let events = [MidiEvent::note_on(60, 0.8), MidiEvent::note_on(64, 0.8)];
/// pool.render_block(&mut [&mut left[..], &mut right[..]], 0, 512, &events, &params);
///
/// assert_eq!(pool.active_voice_count(), 2);
/// assert!(left.iter().any(|s| *s != 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct VoicePool<const VOICES: usize = DEFAULT_VOICES> {
    voices: [VoiceSlot; VOICES],
    strategy: StealingStrategy,
    age_counter: u64,
    sample_rate: f32,
    max_block_size: usize,
}

impl<const VOICES: usize> VoicePool<VOICES> {
    /// Builds every voice from `config`.
    ///
    /// The config is used as given; call [`EngineConfig::validate`] first when it
    /// comes from user input.
    pub fn new(config: EngineConfig) -> Self {
        let voices = std::array::from_fn(|_| VoiceSlot {
            voice: Voice::new(&config),
            age: 0,
        });
        log::debug!(
            "created {} voices at {} Hz (block size {})",
            VOICES,
            config.sample_rate,
            config.max_block_size
        );

        Self {
            voices,
            strategy: config.stealing_strategy,
            age_counter: 0,
            sample_rate: config.sample_rate,
            max_block_size: config.max_block_size,
        }
    }

    pub fn with_strategy(mut self, strategy: StealingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn set_strategy(&mut self, strategy: StealingStrategy) {
        self.strategy = strategy;
    }

    pub fn strategy(&self) -> StealingStrategy {
        self.strategy
    }

    /// Reconfigures every voice for a new sample rate and block size.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        log::debug!(
            "preparing {} voices: {} Hz, block size {}",
            VOICES,
            sample_rate,
            max_block_size
        );
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        for slot in self.voices.iter_mut() {
            slot.voice.prepare(sample_rate, max_block_size);
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        log::debug!("sample rate changed to {} Hz", sample_rate);
        self.sample_rate = sample_rate;
        for slot in self.voices.iter_mut() {
            slot.voice.set_sample_rate(sample_rate);
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Renders one block.
    ///
    /// Applies `params` to all voices, dispatches `events` in order and adds every
    /// active voice into `output[..][start_sample..start_sample + num_samples]`.
    /// `output` holds one (mono) or two (left, right) channels.
    pub fn render_block(
        &mut self,
        output: &mut [&mut [f32]],
        start_sample: usize,
        num_samples: usize,
        events: &[MidiEvent],
        params: &ParameterSnapshot,
    ) {
        for slot in self.voices.iter_mut() {
            slot.voice.apply_parameters(params);
        }

        for event in events {
            self.handle_event(event);
        }

        for slot in self.voices.iter_mut() {
            slot.voice.render(output, start_sample, num_samples);
        }
    }

    pub fn handle_event(&mut self, event: &MidiEvent) {
        match *event {
            MidiEvent::NoteOn { note, velocity } => self.note_on(note, velocity),
            MidiEvent::NoteOff {
                note,
                allow_tail_off,
            } => self.note_off(note, allow_tail_off),
        }
    }

    /// Starts `note`, stealing a voice if none is idle.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        // a retriggered note lets its previous voice ring out
        for slot in self.voices.iter_mut() {
            if slot.voice.note() == Some(note) {
                slot.voice.stop_note(true);
            }
        }

        let Some(idx) = self.find_voice_to_use() else {
            log::debug!("all {} voices busy, dropping note {}", VOICES, note);
            return;
        };

        self.age_counter = self.age_counter.wrapping_add(1);
        let slot = &mut self.voices[idx];
        if slot.voice.is_active() {
            log::debug!(
                "stealing voice {} (note {:?}) for note {}",
                idx,
                slot.voice.note(),
                note
            );
            slot.voice.stop_note(false);
        }
        slot.age = self.age_counter;
        slot.voice.start_note(note, velocity);
    }

    /// Stops every voice holding `note`.
    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) {
        for slot in self.voices.iter_mut() {
            if slot.voice.note() == Some(note) {
                slot.voice.stop_note(allow_tail_off);
            }
        }
    }

    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        for slot in self.voices.iter_mut() {
            slot.voice.stop_note(allow_tail_off);
        }
    }

    /// Returns true while a voice holds `note` and has not been released.
    pub fn is_note_playing(&self, note: u8) -> bool {
        self.voices
            .iter()
            .any(|s| s.voice.note() == Some(note) && !s.voice.is_releasing())
    }

    /// Number of voices that are playing or releasing.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|s| s.voice.is_active()).count()
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index).map(|s| &s.voice)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter().map(|s| &s.voice)
    }

    fn find_voice_to_use(&self) -> Option<usize> {
        self.voices
            .iter()
            .position(|s| !s.voice.is_active())
            .or_else(|| self.find_voice_to_steal())
    }

    fn find_voice_to_steal(&self) -> Option<usize> {
        match self.strategy {
            StealingStrategy::Oldest => self.find_oldest_voice(),
            StealingStrategy::Quietest => self.find_quietest_voice(),
            StealingStrategy::Released => self
                .find_oldest_released_voice()
                .or_else(|| self.find_oldest_voice()),
            StealingStrategy::None => None,
        }
    }

    fn find_oldest_voice(&self) -> Option<usize> {
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.age)
            .map(|(idx, _)| idx)
    }

    fn find_quietest_voice(&self) -> Option<usize> {
        self.voices
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.voice
                    .envelope_level()
                    .partial_cmp(&b.voice.envelope_level())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| idx)
    }

    fn find_oldest_released_voice(&self) -> Option<usize> {
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, s)| s.voice.is_releasing())
            .min_by_key(|(_, s)| s.age)
            .map(|(idx, _)| idx)
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
