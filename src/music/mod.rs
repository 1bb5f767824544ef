//! Note-level building blocks: envelopes, voices and the voice pool.

mod adsr;
pub mod envelope;
pub mod events;
pub mod frequency;
pub mod params;
mod pool;
mod voice;

pub use adsr::{ADSR, EnvelopeState};
pub use envelope::Envelope;
pub use events::MidiEvent;
pub use params::{ParameterId, ParameterSnapshot, ParseError};
pub use pool::{DEFAULT_VOICES, StealingStrategy, VoicePool};
pub use voice::{
    ATTACK_SCALE, RELEASE_SCALE, RELEASE_THRESHOLD, ROTATION_LATENCY, VOICE_GAIN, Voice,
    VoiceState,
};
