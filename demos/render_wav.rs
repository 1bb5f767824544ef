//! Renders a short chord progression to a stereo WAV file.
//!
//! Usage: `cargo run --example render_wav [output.wav]`
//!
//! The rotation angles sweep over the length of the file so the stereo image
//! drifts while the chords play.

use anyhow::Result;
use spinsynth::{EngineConfig, MidiEvent, ParameterSnapshot, VoicePool, note};
use std::f32::consts::TAU;

const SAMPLE_RATE: u32 = 44100;
const BLOCK: usize = 256;
const CHORD_SECONDS: f32 = 1.5;

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "spinsynth.wav".to_string());

    let config = EngineConfig::default()
        .with_sample_rate(SAMPLE_RATE as f32)
        .with_max_block_size(BLOCK);
    config.validate()?;
    let mut pool: VoicePool = VoicePool::new(config);

    let chords: [&[u8]; 4] = [
        &[note!("C3"), note!("E4"), note!("G4")],
        &[note!("A2"), note!("C4"), note!("E4")],
        &[note!("F2"), note!("A3"), note!("C4")],
        &[note!("G2"), note!("B3"), note!("D4")],
    ];

    let mut gains = [0.0; spinsynth::HARMONICS];
    for (k, gain) in gains.iter_mut().enumerate() {
        *gain = 1.0 / (k + 1) as f32;
    }
    let mut params = ParameterSnapshot::default()
        .with_envelope(0.02, 0.3, 0.6, 0.2)
        .with_harmonic_gains(gains);

    let chord_blocks = (CHORD_SECONDS * SAMPLE_RATE as f32) as usize / BLOCK;
    let tail_blocks = SAMPLE_RATE as usize / BLOCK;
    let total_blocks = chord_blocks * chords.len() + tail_blocks;

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec)?;

    let mut left = vec![0.0; BLOCK];
    let mut right = vec![0.0; BLOCK];
    let mut events = Vec::new();

    for block in 0..total_blocks {
        events.clear();
        if block % chord_blocks == 0 {
            let index = block / chord_blocks;
            if index > 0 && index <= chords.len() {
                for &n in chords[index - 1] {
                    events.push(MidiEvent::note_off(n, true));
                }
            }
            if let Some(chord) = chords.get(index) {
                for &n in chord.iter() {
                    events.push(MidiEvent::note_on(n, 0.8));
                }
            }
        }

        let progress = block as f32 / total_blocks as f32;
        params.phi = (progress * TAU).rem_euclid(TAU);
        params.theta = (progress * TAU * 0.5).rem_euclid(TAU);

        left.fill(0.0);
        right.fill(0.0);
        pool.render_block(&mut [&mut left[..], &mut right[..]], 0, BLOCK, &events, &params);

        for (l, r) in left.iter().zip(right.iter()) {
            writer.write_sample(*l)?;
            writer.write_sample(*r)?;
        }
    }

    writer.finalize()?;
    println!(
        "Wrote {:.1} s of audio to {}",
        (total_blocks * BLOCK) as f32 / SAMPLE_RATE as f32,
        path
    );
    Ok(())
}
