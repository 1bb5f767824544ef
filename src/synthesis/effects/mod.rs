//! Stereo effects applied per voice.

mod spin;

pub use spin::{CHUNK_SIZE, MAX_CARRY, SPIN_X, SPIN_Y, SPIN_Z, SpinRotation};
