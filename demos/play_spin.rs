//! Plays an arpeggio through the default output device while the rotation
//! angles sweep.
//!
//! Usage: `cargo run --example play_spin`

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, StreamConfig};
use spinsynth::{EngineConfig, MidiEvent, ParameterSnapshot, VoicePool, note};
use std::f32::consts::TAU;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MAX_BLOCK: usize = 4096;
const STEP: Duration = Duration::from_millis(250);

/// Engine plus everything the audio callback needs between blocks.
struct AudioState {
    pool: VoicePool,
    params: ParameterSnapshot,
    events: Vec<MidiEvent>,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl AudioState {
    fn new(sample_rate: f32) -> Result<Self> {
        let config = EngineConfig::default()
            .with_sample_rate(sample_rate)
            .with_max_block_size(MAX_BLOCK);
        config.validate()?;

        let mut gains = [0.0; spinsynth::HARMONICS];
        for k in (0..gains.len()).step_by(2) {
            gains[k] = 1.0 / (k + 1) as f32;
        }

        Ok(Self {
            pool: VoicePool::new(config),
            params: ParameterSnapshot::default()
                .with_envelope(0.01, 0.2, 0.5, 0.3)
                .with_harmonic_gains(gains),
            events: Vec::with_capacity(16),
            left: vec![0.0; MAX_BLOCK],
            right: vec![0.0; MAX_BLOCK],
        })
    }

    fn render(&mut self, frames: usize) {
        if frames > self.left.len() {
            self.left.resize(frames, 0.0);
            self.right.resize(frames, 0.0);
        }
        self.left[..frames].fill(0.0);
        self.right[..frames].fill(0.0);
        self.pool.render_block(
            &mut [&mut self.left[..frames], &mut self.right[..frames]],
            0,
            frames,
            &self.events,
            &self.params,
        );
        self.events.clear();
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0 as f32;
    let state = Arc::new(Mutex::new(AudioState::new(sample_rate)?));

    let _stream = match config.sample_format() {
        SampleFormat::F32 => create_audio_stream::<f32>(&device, &config.into(), state.clone())?,
        SampleFormat::I16 => create_audio_stream::<i16>(&device, &config.into(), state.clone())?,
        SampleFormat::U16 => create_audio_stream::<u16>(&device, &config.into(), state.clone())?,
        sample_format => {
            return Err(anyhow::anyhow!(
                "Unsupported sample format: {}",
                sample_format
            ));
        }
    };

    let arpeggio = [
        note!("C3"),
        note!("G3"),
        note!("E4"),
        note!("B4"),
        note!("D5"),
        note!("A4"),
        note!("F#4"),
        note!("D4"),
    ];

    println!("Playing... (Ctrl+C to stop early)");
    for step in 0..arpeggio.len() * 4 {
        let current = arpeggio[step % arpeggio.len()];
        let previous = arpeggio[(step + arpeggio.len() - 1) % arpeggio.len()];
        {
            let mut s = state
                .lock()
                .map_err(|_| anyhow::anyhow!("audio state poisoned"))?;
            if step > 0 {
                s.events.push(MidiEvent::note_off(previous, true));
            }
            s.events.push(MidiEvent::note_on(current, 0.8));

            let angle = step as f32 / 8.0;
            s.params.phi = angle.rem_euclid(TAU);
            s.params.theta = (angle * 0.37).rem_euclid(TAU);
        }
        std::thread::sleep(STEP);
    }

    {
        let mut s = state
            .lock()
            .map_err(|_| anyhow::anyhow!("audio state poisoned"))?;
        s.pool.all_notes_off(true);
    }
    std::thread::sleep(Duration::from_secs(1));
    Ok(())
}

/// Creates an output stream that renders one engine block per callback.
fn create_audio_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    state: Arc<Mutex<AudioState>>,
) -> Result<cpal::Stream>
where
    T: Sample + FromSample<f32> + cpal::SizedSample,
{
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut state) = state.lock() else {
                return;
            };
            let frames = data.len() / channels;
            state.render(frames);
            for (i, frame) in data.chunks_mut(channels).enumerate() {
                for (ch, s) in frame.iter_mut().enumerate() {
                    let value = if ch % 2 == 0 { state.left[i] } else { state.right[i] };
                    *s = T::from_sample(value);
                }
            }
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )?;

    stream.play()?;
    Ok(stream)
}
