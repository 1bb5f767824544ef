//! Per-block parameter snapshot and named parameter access.

use crate::synthesis::oscillators::HARMONICS;
use std::f32::consts::TAU;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Error returned when a parameter key cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input string was empty
    Empty,
    /// No parameter has this key
    UnknownKey(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "parameter key is empty"),
            ParseError::UnknownKey(s) => write!(f, "unknown parameter key: '{}'", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Identifies one automatable parameter.
///
/// # Examples
///
/// ```
/// use spinsynth::music::params::ParameterId;
///
/// let id: ParameterId = "harmonic3".parse().unwrap();
/// assert_eq!(id, ParameterId::HarmonicGain(3));
/// assert_eq!(id.key(), "harmonic3");
/// assert!("harmonic16".parse::<ParameterId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterId {
    /// Attack time in seconds, before the voice's ×2 scaling
    Attack,
    /// Decay time in seconds
    Decay,
    /// Sustain level
    Sustain,
    /// Release time in seconds, before the voice's ×3 scaling
    Release,
    /// Gain of harmonic `n` (0-15)
    HarmonicGain(u8),
    /// Azimuthal rotation angle in radians
    Phi,
    /// Polar rotation angle in radians
    Theta,
}

impl ParameterId {
    /// Every parameter, in host registration order.
    pub fn all() -> impl Iterator<Item = ParameterId> {
        (0..HARMONICS as u8)
            .map(ParameterId::HarmonicGain)
            .chain([
                ParameterId::Attack,
                ParameterId::Decay,
                ParameterId::Sustain,
                ParameterId::Release,
                ParameterId::Phi,
                ParameterId::Theta,
            ])
    }

    /// Range a host should expose for this parameter.
    pub fn range(&self) -> RangeInclusive<f32> {
        match self {
            ParameterId::Phi | ParameterId::Theta => 0.0..=TAU,
            _ => 0.0..=1.0,
        }
    }

    pub fn default_value(&self) -> f32 {
        ParameterSnapshot::default().get(*self)
    }

    /// Stable string key, e.g. `"attack"` or `"harmonic3"`.
    pub fn key(&self) -> String {
        match self {
            ParameterId::Attack => "attack".to_string(),
            ParameterId::Decay => "decay".to_string(),
            ParameterId::Sustain => "sustain".to_string(),
            ParameterId::Release => "release".to_string(),
            ParameterId::HarmonicGain(n) => format!("harmonic{}", n),
            ParameterId::Phi => "phi".to_string(),
            ParameterId::Theta => "theta".to_string(),
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ParameterId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        match s.to_lowercase().as_str() {
            "attack" => Ok(ParameterId::Attack),
            // older presets stored decay under "delay"
            "decay" | "delay" => Ok(ParameterId::Decay),
            "sustain" => Ok(ParameterId::Sustain),
            "release" => Ok(ParameterId::Release),
            "phi" => Ok(ParameterId::Phi),
            "theta" => Ok(ParameterId::Theta),
            other => other
                .strip_prefix("harmonic")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| usize::from(*n) < HARMONICS)
                .map(ParameterId::HarmonicGain)
                .ok_or_else(|| ParseError::UnknownKey(s.to_string())),
        }
    }
}

/// Parameter values for one audio block.
///
/// The engine uses these values as given. Hosts that want range checking call
/// [`normalized`](Self::normalized) first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub harmonic_gains: [f32; HARMONICS],
    pub phi: f32,
    pub theta: f32,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        let mut harmonic_gains = [0.0; HARMONICS];
        harmonic_gains[0] = 1.0;
        Self {
            attack: 0.0,
            decay: 0.5,
            sustain: 0.5,
            release: 0.1,
            harmonic_gains,
            phi: 0.0,
            theta: 0.0,
        }
    }
}

impl ParameterSnapshot {
    pub fn with_envelope(mut self, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        self.attack = attack;
        self.decay = decay;
        self.sustain = sustain;
        self.release = release;
        self
    }

    pub fn with_harmonic_gains(mut self, gains: [f32; HARMONICS]) -> Self {
        self.harmonic_gains = gains;
        self
    }

    pub fn with_angles(mut self, phi: f32, theta: f32) -> Self {
        self.phi = phi;
        self.theta = theta;
        self
    }

    /// Reads one parameter.
    ///
    /// # Panics
    ///
    /// Panics if a harmonic index is 16 or above.
    pub fn get(&self, id: ParameterId) -> f32 {
        match id {
            ParameterId::Attack => self.attack,
            ParameterId::Decay => self.decay,
            ParameterId::Sustain => self.sustain,
            ParameterId::Release => self.release,
            ParameterId::HarmonicGain(n) => self.harmonic_gains[usize::from(n)],
            ParameterId::Phi => self.phi,
            ParameterId::Theta => self.theta,
        }
    }

    /// Writes one parameter without validation.
    ///
    /// # Panics
    ///
    /// Panics if a harmonic index is 16 or above.
    pub fn set(&mut self, id: ParameterId, value: f32) {
        match id {
            ParameterId::Attack => self.attack = value,
            ParameterId::Decay => self.decay = value,
            ParameterId::Sustain => self.sustain = value,
            ParameterId::Release => self.release = value,
            ParameterId::HarmonicGain(n) => self.harmonic_gains[usize::from(n)] = value,
            ParameterId::Phi => self.phi = value,
            ParameterId::Theta => self.theta = value,
        }
    }

    /// Returns a copy with every value forced into its host range.
    ///
    /// Envelope values and gains are clamped; angles wrap into [0, 2π).
    pub fn normalized(&self) -> Self {
        let mut out = *self;
        for id in ParameterId::all() {
            let value = self.get(id);
            let fixed = match id {
                ParameterId::Phi | ParameterId::Theta => wrap_angle(value),
                _ => {
                    let range = id.range();
                    value.clamp(*range.start(), *range.end())
                }
            };
            out.set(id, fixed);
        }
        out
    }
}

fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}
