//! Block rendering benchmarks.
//!
//! A block must render faster than it plays back:
//!
//! ```text
//! time_budget = block_size / sample_rate
//! ```
//!
//! At 44.1 kHz a 512-sample block has 11.6 ms; a 64-sample block has 1.45 ms.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use spinsynth::{
    EngineConfig, HARMONICS, HarmonicOscillatorBank, MidiEvent, ParameterSnapshot, SpinRotation,
    VoicePool,
};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZES: [usize; 4] = [64, 128, 256, 512];

fn full_params() -> ParameterSnapshot {
    ParameterSnapshot::default()
        .with_envelope(0.01, 0.2, 0.7, 0.3)
        .with_harmonic_gains([0.5; HARMONICS])
        .with_angles(0.8, 1.3)
}

fn bench_oscillator_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("harmonic_bank");
    for &size in &BLOCK_SIZES {
        let mut bank = HarmonicOscillatorBank::new(SAMPLE_RATE);
        bank.set_harm_gains(&[0.5; HARMONICS]);
        let mut out = vec![0.0; size];

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| bank.process_midi(black_box(&mut out), 1.0, 69));
        });
    }
    group.finish();
}

fn bench_spin_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("spin_rotation");
    for &size in &BLOCK_SIZES {
        let mut rotation = SpinRotation::new();
        rotation.set_angles(0.8, 1.3);
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.01).sin()).collect();
        let mut out_left = vec![0.0; size + 3];
        let mut out_right = vec![0.0; size + 3];

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                rotation.spin_rotate(
                    black_box(&input),
                    black_box(&input),
                    &mut out_left,
                    &mut out_right,
                )
            });
        });
    }
    group.finish();
}

fn bench_full_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("voice_pool_8_voices");
    let params = full_params();
    let chord: Vec<MidiEvent> = (0..8).map(|i| MidiEvent::note_on(48 + i * 3, 0.8)).collect();
    let no_events: [MidiEvent; 0] = [];

    for &size in &BLOCK_SIZES {
        let config = EngineConfig::default().with_max_block_size(size);
        let mut pool: VoicePool = VoicePool::new(config);
        let mut left = vec![0.0; size];
        let mut right = vec![0.0; size];
        pool.render_block(&mut [&mut left[..], &mut right[..]], 0, size, &chord, &params);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                pool.render_block(
                    &mut [&mut left[..], &mut right[..]],
                    0,
                    size,
                    black_box(&no_events),
                    &params,
                );
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_oscillator_bank,
    bench_spin_rotation,
    bench_full_polyphony
);
criterion_main!(benches);
