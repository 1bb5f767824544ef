//! Note events delivered to the engine with each block.

/// A MIDI note event.
///
/// Events are applied in slice order at the start of the block they arrive with.
/// Note numbers must be in 0-127.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiEvent {
    NoteOn { note: u8, velocity: f32 },
    /// With `allow_tail_off` the voice enters its release phase; without it the
    /// voice stops at once.
    NoteOff { note: u8, allow_tail_off: bool },
}

impl MidiEvent {
    pub fn note_on(note: u8, velocity: f32) -> Self {
        MidiEvent::NoteOn { note, velocity }
    }

    pub fn note_off(note: u8, allow_tail_off: bool) -> Self {
        MidiEvent::NoteOff {
            note,
            allow_tail_off,
        }
    }

    pub fn note(&self) -> u8 {
        match self {
            MidiEvent::NoteOn { note, .. } | MidiEvent::NoteOff { note, .. } => *note,
        }
    }
}
