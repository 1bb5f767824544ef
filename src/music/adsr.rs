//! ADSR (Attack, Decay, Sustain, Release) envelope generator.

use super::envelope::Envelope;

/// State of the ADSR envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is not active
    Idle,
    /// Ramping from the current level to 1
    Attack,
    /// Ramping from 1 to the sustain level
    Decay,
    /// Holding at the sustain level
    Sustain,
    /// Ramping from the level at release time to 0
    Release,
}

/// Linear ADSR envelope generator.
///
/// Each segment moves the level by a fixed per-sample rate derived from its
/// duration:
/// - **Attack**: 0 → 1 over `attack` seconds
/// - **Decay**: 1 → `sustain` over `decay` seconds
/// - **Sustain**: holds `sustain` until release
/// - **Release**: current level → 0 over `release` seconds
///
/// Segments with a duration of zero are skipped. Parameters are not validated:
/// negative durations behave like zero, a sustain level above 1 is held as-is.
///
/// # Examples
///
/// ```
/// use spinsynth::ADSR;
/// use spinsynth::music::envelope::Envelope;
///
/// // 10ms attack, 100ms decay, 70% sustain, 300ms release
/// let mut env = ADSR::new(0.01, 0.1, 0.7, 0.3, 44100.0);
///
/// env.trigger(1.0);
/// for _ in 0..1000 {
///     env.next_sample();
/// }
///
/// env.release();
/// while env.is_active() {
///     env.next_sample();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ADSR {
    state: EnvelopeState,
    level: f32,
    release_start_level: f32,

    // Time parameters (in seconds)
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    // Per-sample level increments; <= 0 marks a zero-length segment
    attack_rate: f32,
    decay_rate: f32,
    release_rate: f32,

    sample_rate: f32,
}

impl ADSR {
    /// Creates a new ADSR envelope in the idle state.
    ///
    /// # Arguments
    ///
    /// * `attack_time` - Attack time in seconds
    /// * `decay_time` - Decay time in seconds
    /// * `sustain_level` - Sustain level, nominally 0.0 to 1.0
    /// * `release_time` - Release time in seconds
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(
        attack_time: f32,
        decay_time: f32,
        sustain_level: f32,
        release_time: f32,
        sample_rate: f32,
    ) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            attack_time,
            decay_time,
            sustain_level,
            release_time,
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
            sample_rate,
        };
        env.recalculate_rates();
        env
    }

    /// Replaces all four parameters without restarting the envelope.
    ///
    /// A running segment continues from the current level at its new rate.
    pub fn set_parameters(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack;
        self.decay_time = decay;
        self.sustain_level = sustain;
        self.release_time = release;
        self.recalculate_rates();
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_rates();
    }

    /// Resets the envelope to idle at level 0.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_start_level = 0.0;
    }

    /// Current output level.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn is_releasing(&self) -> bool {
        self.state == EnvelopeState::Release
    }

    fn rate(&self, distance: f32, time: f32) -> f32 {
        if time > 0.0 {
            distance / (time * self.sample_rate)
        } else {
            -1.0
        }
    }

    fn recalculate_rates(&mut self) {
        self.attack_rate = self.rate(1.0, self.attack_time);
        self.decay_rate = self.rate(1.0 - self.sustain_level, self.decay_time);
        self.release_rate = self.rate(self.release_start_level, self.release_time);

        let finished = match self.state {
            EnvelopeState::Attack => self.attack_rate <= 0.0,
            EnvelopeState::Decay => self.decay_rate <= 0.0 || self.level <= self.sustain_level,
            EnvelopeState::Release => self.release_rate <= 0.0,
            EnvelopeState::Idle | EnvelopeState::Sustain => false,
        };
        if finished {
            self.advance_state();
        }
    }

    fn advance_state(&mut self) {
        match self.state {
            EnvelopeState::Attack => {
                self.state = if self.decay_rate > 0.0 {
                    EnvelopeState::Decay
                } else {
                    EnvelopeState::Sustain
                };
            }
            EnvelopeState::Decay => self.state = EnvelopeState::Sustain,
            EnvelopeState::Release => self.reset(),
            EnvelopeState::Idle | EnvelopeState::Sustain => {}
        }
    }
}

impl Envelope for ADSR {
    fn trigger(&mut self, _velocity: f32) {
        if self.attack_rate > 0.0 {
            self.state = EnvelopeState::Attack;
        } else if self.decay_rate > 0.0 {
            self.level = 1.0;
            self.state = EnvelopeState::Decay;
        } else {
            self.level = self.sustain_level;
            self.state = EnvelopeState::Sustain;
        }
    }

    fn release(&mut self) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        if self.release_time > 0.0 {
            self.release_start_level = self.level;
            self.release_rate = self.rate(self.level, self.release_time);
            self.state = EnvelopeState::Release;
        } else {
            self.reset();
        }
    }

    fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    fn next_sample(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => return 0.0,
            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.advance_state();
                }
            }
            EnvelopeState::Decay => {
                self.level -= self.decay_rate;
                if self.level <= self.sustain_level {
                    self.level = self.sustain_level;
                    self.advance_state();
                }
            }
            EnvelopeState::Sustain => self.level = self.sustain_level,
            EnvelopeState::Release => {
                self.level -= self.release_rate;
                if self.level <= 0.0 {
                    self.advance_state();
                }
            }
        }
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Durations below are multiples of 1/100 s chosen so the rates are exact binary
    // fractions.
    const SAMPLE_RATE: f32 = 100.0;
    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_creation() {
        let env = ADSR::new(0.1, 0.2, 0.7, 0.3, SAMPLE_RATE);
        assert!(!env.is_active());
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn test_note_on_activates() {
        let mut env = ADSR::new(0.1, 0.2, 0.7, 0.3, SAMPLE_RATE);
        env.trigger(1.0);
        assert!(env.is_active());
        assert_eq!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn test_idle_outputs_zero() {
        let mut env = ADSR::new(0.1, 0.2, 0.7, 0.3, SAMPLE_RATE);
        assert_eq!(env.next_sample(), 0.0);
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn test_attack_phase_linear() {
        // 64 samples of attack
        let mut env = ADSR::new(0.64, 0.32, 0.5, 0.0, SAMPLE_RATE);
        env.trigger(1.0);

        let first = env.next_sample();
        assert!(approx_eq(first, 1.0 / 64.0));

        for _ in 0..30 {
            env.next_sample();
        }
        assert!(approx_eq(env.next_sample(), 0.5));

        for _ in 0..31 {
            env.next_sample();
        }
        assert!(approx_eq(env.level(), 63.0 / 64.0));
        assert_eq!(env.state(), EnvelopeState::Attack);

        env.next_sample();
        assert!(approx_eq(env.level(), 1.0));
        assert_eq!(env.state(), EnvelopeState::Decay);
    }

    #[test]
    fn test_decay_phase_linear() {
        // decay 1.0 -> 0.5 over 32 samples
        let mut env = ADSR::new(0.0, 0.32, 0.5, 0.0, SAMPLE_RATE);
        env.trigger(1.0);
        assert_eq!(env.state(), EnvelopeState::Decay);
        assert_eq!(env.level(), 1.0);

        let mut count = 0;
        while env.state() == EnvelopeState::Decay && count < 100 {
            env.next_sample();
            count += 1;
        }
        assert_eq!(count, 32);
        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!(approx_eq(env.next_sample(), 0.5));
    }

    #[test]
    fn test_instant_attack_and_decay_go_straight_to_sustain() {
        let mut env = ADSR::new(0.0, 0.0, 0.6, 0.0, SAMPLE_RATE);
        env.trigger(1.0);
        assert_eq!(env.state(), EnvelopeState::Sustain);

        for _ in 0..100 {
            assert!(approx_eq(env.next_sample(), 0.6));
        }
    }

    #[test]
    fn test_release_phase_linear() {
        // 0.5 -> 0 over 64 samples
        let mut env = ADSR::new(0.0, 0.0, 0.5, 0.64, SAMPLE_RATE);
        env.trigger(1.0);
        env.next_sample();

        env.release();
        assert_eq!(env.state(), EnvelopeState::Release);

        assert!(approx_eq(env.next_sample(), 0.5 - 1.0 / 128.0));
        for _ in 0..31 {
            env.next_sample();
        }
        assert!(approx_eq(env.level(), 0.25));

        let mut count = 0;
        while env.is_active() && count < 100 {
            env.next_sample();
            count += 1;
        }
        assert_eq!(count, 32);
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn test_note_off_during_attack() {
        let mut env = ADSR::new(0.64, 0.1, 0.7, 0.5, SAMPLE_RATE);
        env.trigger(1.0);

        for _ in 0..16 {
            env.next_sample();
        }
        assert_eq!(env.state(), EnvelopeState::Attack);
        let level_before_release = env.level();
        assert!(approx_eq(level_before_release, 0.25));

        env.release();
        assert_eq!(env.state(), EnvelopeState::Release);

        // release ramps from the attack level, not from the sustain level
        let next = env.next_sample();
        assert!(next < level_before_release);
        assert!(approx_eq(next, 0.25 - 0.25 / 50.0));
    }

    #[test]
    fn test_zero_release_time_goes_idle_immediately() {
        let mut env = ADSR::new(0.0, 0.0, 0.7, 0.0, SAMPLE_RATE);
        env.trigger(1.0);
        env.next_sample();

        env.release();
        assert!(!env.is_active());
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn test_note_off_while_idle() {
        let mut env = ADSR::new(0.1, 0.1, 0.7, 0.1, SAMPLE_RATE);
        env.release();
        assert!(!env.is_active());
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut env = ADSR::new(0.1, 0.1, 0.7, 0.1, SAMPLE_RATE);
        env.trigger(1.0);
        for _ in 0..5 {
            env.next_sample();
        }

        env.reset();
        assert!(!env.is_active());
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn test_sustain_follows_new_parameters() {
        let mut env = ADSR::new(0.0, 0.0, 0.6, 0.1, SAMPLE_RATE);
        env.trigger(1.0);
        env.next_sample();

        env.set_parameters(0.0, 0.0, 0.3, 0.1);
        assert!(approx_eq(env.next_sample(), 0.3));
    }

    #[test]
    fn test_parameter_change_keeps_release_slope_from_release_level() {
        let mut env = ADSR::new(0.0, 0.0, 0.5, 0.64, SAMPLE_RATE);
        env.trigger(1.0);
        env.next_sample();
        env.release();

        // a new sustain level must not change the release ramp
        env.set_parameters(0.0, 0.0, 1.0, 0.64);
        assert!(approx_eq(env.next_sample(), 0.5 - 1.0 / 128.0));
    }

    #[test]
    fn test_zeroing_attack_mid_attack_moves_on() {
        let mut env = ADSR::new(1.0, 0.5, 0.5, 0.1, SAMPLE_RATE);
        env.trigger(1.0);
        env.next_sample();

        env.set_parameters(0.0, 0.5, 0.5, 0.1);
        assert_eq!(env.state(), EnvelopeState::Decay);
    }

    #[test]
    fn test_full_envelope_cycle() {
        let mut env = ADSR::new(0.1, 0.1, 0.6, 0.1, SAMPLE_RATE);
        env.trigger(1.0);

        let mut steps = 0;
        while env.state() != EnvelopeState::Sustain && steps < 100 {
            let level = env.next_sample();
            assert!((0.0..=1.0).contains(&level));
            steps += 1;
        }
        assert!((19..=22).contains(&steps));

        for _ in 0..20 {
            assert!(approx_eq(env.next_sample(), 0.6));
        }

        env.release();
        let mut steps = 0;
        while env.is_active() && steps < 100 {
            let level = env.next_sample();
            assert!((0.0..=0.6).contains(&level));
            steps += 1;
        }
        assert!((9..=11).contains(&steps));
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn test_sample_rate_change_rescales_segments() {
        let mut env = ADSR::new(0.64, 0.0, 1.0, 0.0, SAMPLE_RATE);
        env.set_sample_rate(200.0);
        env.trigger(1.0);
        assert!(approx_eq(env.next_sample(), 1.0 / 128.0));
    }
}
