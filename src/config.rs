//! Engine configuration.

use crate::music::StealingStrategy;
use std::fmt;

/// Error returned by [`EngineConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Sample rate must be finite and at least 1 Hz
    InvalidSampleRate(f32),
    /// Block size must be non-zero
    InvalidBlockSize(usize),
    /// Reference frequency must be finite and positive
    InvalidReferenceFrequency(f32),
    /// Table scaling must be finite
    InvalidTableScaling(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSampleRate(v) => write!(f, "invalid sample rate: {} Hz", v),
            ConfigError::InvalidBlockSize(v) => write!(f, "invalid block size: {}", v),
            ConfigError::InvalidReferenceFrequency(v) => {
                write!(f, "invalid reference frequency: {} Hz", v)
            }
            ConfigError::InvalidTableScaling(v) => write!(f, "invalid table scaling: {}", v),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Setup-time configuration for a [`VoicePool`](crate::VoicePool).
///
/// # Examples
///
/// ```
/// use spinsynth::{EngineConfig, StealingStrategy};
///
/// let config = EngineConfig::default()
///     .with_sample_rate(48000.0)
///     .with_max_block_size(256)
///     .with_stealing_strategy(StealingStrategy::Oldest);
/// assert!(config.validate().is_ok());
///
/// assert!(EngineConfig::default().with_sample_rate(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Largest block the host will render; scratch buffers are sized from it
    pub max_block_size: usize,
    pub stealing_strategy: StealingStrategy,
    /// Cycles per second stored in the generated reference table
    pub reference_frequency: f32,
    /// Amplitude of the generated reference table
    pub table_scaling: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            max_block_size: 512,
            stealing_strategy: StealingStrategy::default(),
            reference_frequency: 1.0,
            table_scaling: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_stealing_strategy(mut self, strategy: StealingStrategy) -> Self {
        self.stealing_strategy = strategy;
        self
    }

    pub fn with_reference_frequency(mut self, reference_frequency: f32) -> Self {
        self.reference_frequency = reference_frequency;
        self
    }

    pub fn with_table_scaling(mut self, table_scaling: f32) -> Self {
        self.table_scaling = table_scaling;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate < 1.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(ConfigError::InvalidBlockSize(self.max_block_size));
        }
        if !self.reference_frequency.is_finite() || self.reference_frequency <= 0.0 {
            return Err(ConfigError::InvalidReferenceFrequency(
                self.reference_frequency,
            ));
        }
        if !self.table_scaling.is_finite() {
            return Err(ConfigError::InvalidTableScaling(self.table_scaling));
        }
        Ok(())
    }
}
