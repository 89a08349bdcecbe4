//! Resample Benchmarks
//!
//! Performance benchmarks for export rendering and the preview producer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pcmtool::engine::{resample, AudioProducer, PreviewSession, TARGET_SAMPLE_RATE};

fn sine(frequency: f64, seconds: f64, sample_rate: u32) -> Vec<i16> {
    let frames = (seconds * sample_rate as f64) as usize;
    (0..frames)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            ((2.0 * std::f64::consts::PI * frequency * t).sin() * 16000.0) as i16
        })
        .collect()
}

fn benchmark_resample(c: &mut Criterion) {
    let samples = sine(440.0, 10.0, 44100);

    c.bench_function("resample_10s_44100_to_17500", |b| {
        b.iter(|| resample(black_box(&samples), 44100, TARGET_SAMPLE_RATE).unwrap())
    });
}

fn benchmark_preview_block(c: &mut Criterion) {
    let samples = sine(440.0, 1.0, 44100);
    let mut session = PreviewSession::from_samples(samples, 0, 44100, true);
    session.setup(48000);
    let mut out = vec![0i16; 512];

    c.bench_function("preview_loop_block_512", |b| {
        b.iter(|| {
            session.produce(black_box(&mut out));
        })
    });
}

criterion_group!(benches, benchmark_resample, benchmark_preview_block);
criterion_main!(benches);
