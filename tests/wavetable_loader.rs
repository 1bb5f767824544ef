#![cfg(feature = "wavetable-loader")]

use spinsynth::HarmonicOscillatorBank;
use spinsynth::synthesis::wavetable::load_wav;

fn write_wav(path: &std::path::Path, samples: &[i16], channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for s in samples {
        writer.write_sample(*s).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

#[test]
fn loads_first_channel_normalized() {
    let path = std::env::temp_dir().join("spinsynth_loader_stereo.wav");
    write_wav(&path, &[16384, -1, -16384, -1, 0, -1], 2);

    let table = load_wav(&path).expect("load");
    assert_eq!(table, vec![0.5, -0.5, 0.0]);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn empty_file_is_an_error() {
    let path = std::env::temp_dir().join("spinsynth_loader_empty.wav");
    write_wav(&path, &[], 1);

    assert!(load_wav(&path).is_err());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_wav("/nonexistent/spinsynth.wav").is_err());
}

#[test]
fn loaded_table_drives_a_bank() {
    let path = std::env::temp_dir().join("spinsynth_loader_bank.wav");
    let samples: Vec<i16> = (0..8000).map(|i| if i < 4000 { 16384 } else { -16384 }).collect();
    write_wav(&path, &samples, 1);

    let table = load_wav(&path).expect("load");
    let mut bank = HarmonicOscillatorBank::from_table(table, 1.0, 8000.0);
    let out = bank.process_vec(4, 1.0);
    assert_eq!(out, vec![0.5 / 16.0; 4]);
    let _ = std::fs::remove_file(&path);
}
