//! Reference waveform generation.
//!
//! A reference table holds exactly one second of audio at the table's sample rate,
//! so its length equals the sample rate. Oscillators read it cyclically, stepping
//! through it faster or slower to reach the requested pitch.

use std::f64::consts::PI;
use std::fmt;

#[cfg(feature = "wavetable-loader")]
use std::path::Path;

/// Builds one second of a scaled sine at a reference frequency.
///
/// # Examples
///
/// ```
/// use spinsynth::WavetableGenerator;
///
/// let table = WavetableGenerator::new(44100, 1.0, 1.0).generate();
/// assert_eq!(table.len(), 44100);
/// assert_eq!(table[0], 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavetableGenerator {
    sample_rate: u32,
    scaling_factor: f32,
    reference_frequency: f32,
}

impl WavetableGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Table sample rate in Hz; also the table length
    /// * `scaling_factor` - Peak amplitude of the sine
    /// * `reference_frequency` - Number of sine cycles in the one-second table
    pub fn new(sample_rate: u32, scaling_factor: f32, reference_frequency: f32) -> Self {
        Self {
            sample_rate,
            scaling_factor,
            reference_frequency,
        }
    }

    pub fn with_scaling_factor(mut self, scaling_factor: f32) -> Self {
        self.scaling_factor = scaling_factor;
        self
    }

    pub fn with_reference_frequency(mut self, reference_frequency: f32) -> Self {
        self.reference_frequency = reference_frequency;
        self
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    pub fn set_scaling_factor(&mut self, scaling_factor: f32) {
        self.scaling_factor = scaling_factor;
    }

    pub fn set_reference_frequency(&mut self, reference_frequency: f32) {
        self.reference_frequency = reference_frequency;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn reference_frequency(&self) -> f32 {
        self.reference_frequency
    }

    /// Generates the table: `sample_rate` samples of
    /// `scaling_factor * sin(2π · i · reference_frequency / sample_rate)`.
    pub fn generate(&self) -> Vec<f32> {
        let rate = f64::from(self.sample_rate);
        let freq = f64::from(self.reference_frequency);
        let scale = f64::from(self.scaling_factor);
        (0..self.sample_rate)
            .map(|i| (scale * (2.0 * PI * f64::from(i) * freq / rate).sin()) as f32)
            .collect()
    }
}

impl Default for WavetableGenerator {
    /// 44.1 kHz, unit amplitude, one cycle per table.
    fn default() -> Self {
        Self::new(44100, 1.0, 1.0)
    }
}

/// Error returned when a reference table cannot be loaded.
#[derive(Debug)]
pub enum WavetableError {
    /// The file contained no samples
    Empty,
    /// The WAV file could not be opened or decoded
    #[cfg(feature = "wavetable-loader")]
    Wav(hound::Error),
}

impl fmt::Display for WavetableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WavetableError::Empty => write!(f, "wavetable contains no samples"),
            #[cfg(feature = "wavetable-loader")]
            WavetableError::Wav(e) => write!(f, "failed to read wavetable: {}", e),
        }
    }
}

impl std::error::Error for WavetableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WavetableError::Empty => None,
            #[cfg(feature = "wavetable-loader")]
            WavetableError::Wav(e) => Some(e),
        }
    }
}

#[cfg(feature = "wavetable-loader")]
impl From<hound::Error> for WavetableError {
    fn from(e: hound::Error) -> Self {
        WavetableError::Wav(e)
    }
}

/// Loads the first channel of a WAV file as a reference table.
///
/// Integer formats are normalized to [-1.0, 1.0]. No sample rate conversion is
/// performed: the file is read as-is, so a one-second file recorded at the engine
/// rate plays back at its recorded reference frequency.
#[cfg(feature = "wavetable-loader")]
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<Vec<f32>, WavetableError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_value))
                .collect::<Result<_, _>>()?
        }
    };

    let table: Vec<f32> = interleaved.into_iter().step_by(channels).collect();
    if table.is_empty() {
        return Err(WavetableError::Empty);
    }
    log::debug!(
        "loaded {} wavetable samples ({} Hz, {} channel(s))",
        table.len(),
        spec.sample_rate,
        spec.channels
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_length_matches_sample_rate() {
        for rate in [8000, 44100, 48000] {
            assert_eq!(WavetableGenerator::new(rate, 1.0, 1.0).generate().len(), rate as usize);
        }
    }

    #[test]
    fn test_single_cycle_shape() {
        let table = WavetableGenerator::new(1000, 1.0, 1.0).generate();
        assert_eq!(table[0], 0.0);
        assert_abs_diff_eq!(table[250], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(table[500], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(table[750], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_scaling_and_reference_frequency() {
        let table = WavetableGenerator::new(1000, 1.0, 1.0)
            .with_scaling_factor(0.5)
            .with_reference_frequency(2.0)
            .generate();
        // two cycles: first peak at a eighth of the table
        assert_abs_diff_eq!(table[125], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(table[625], 0.5, epsilon = 1e-6);
        assert!(table.iter().all(|s| s.abs() <= 0.5 + 1e-6));
    }

    #[test]
    fn test_deterministic() {
        let generator = WavetableGenerator::default();
        assert_eq!(generator.generate(), generator.generate());
    }

    #[cfg(feature = "wavetable-loader")]
    #[test]
    fn test_missing_wav_is_an_error() {
        let result = load_wav("does/not/exist.wav");
        assert!(matches!(result, Err(WavetableError::Wav(_))));
    }
}
