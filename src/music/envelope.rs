//! Envelope trait for note lifecycles.

/// Trait for envelope generators with lifecycle control.
///
/// Envelopes shape a voice's amplitude in response to note-on and note-off.
/// Unlike plain signals they have a defined lifecycle: they are triggered,
/// released, and eventually fall idle.
///
/// # Examples
///
/// ```
/// use spinsynth::music::envelope::Envelope;
/// use spinsynth::ADSR;
///
/// let mut env = ADSR::new(0.1, 0.1, 0.7, 0.3, 44100.0);
///
/// env.trigger(0.8);
/// assert!(env.is_active());
///
/// for _ in 0..1000 {
///     let level = env.next_sample();
///     assert!((0.0..=1.0).contains(&level));
/// }
///
/// env.release();
/// while env.is_active() {
///     env.next_sample();
/// }
/// ```
pub trait Envelope {
    /// Triggers the envelope, starting the attack phase.
    ///
    /// How `velocity` is applied is up to the implementation; [`ADSR`](crate::ADSR)
    /// ignores it.
    fn trigger(&mut self, velocity: f32);

    /// Starts the release phase.
    fn release(&mut self);

    /// Returns true from trigger until the release phase completes.
    fn is_active(&self) -> bool;

    /// Advances one sample and returns the current level.
    fn next_sample(&mut self) -> f32;
}
