//! Performance benchmarks for ReplayGain analysis
//!
//! Run with: cargo bench -p replaygain-analysis --bench analysis_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use replaygain_analysis::{AnalyzerConfig, GainAnalyzer};
use std::f32::consts::PI;

/// Generate a test signal (1kHz sine wave, one channel)
fn generate_test_signal(sample_rate: u32, duration_secs: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    let frequency = 1000.0;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.5 * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

fn bench_sample_rates(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_sample_rate");

    for sample_rate in [44100_u32, 48000, 96000] {
        let input = generate_test_signal(sample_rate, 1.0);
        group.throughput(Throughput::Elements(input.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("stereo_1s", sample_rate),
            &input,
            |b, input| {
                let mut analyzer =
                    GainAnalyzer::with_config(AnalyzerConfig::normalized()).unwrap();
                analyzer.initialize(sample_rate).unwrap();

                b.iter(|| {
                    analyzer
                        .analyze_stereo(black_box(input), black_box(input))
                        .unwrap();
                    black_box(analyzer.title_gain().unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_block_size");
    let sample_rate = 44100;
    let input = generate_test_signal(sample_rate, 1.0);
    group.throughput(Throughput::Elements(input.len() as u64));

    for block_size in [64_usize, 512, 4096, 44100] {
        group.bench_with_input(
            BenchmarkId::new("mono_1s", block_size),
            &block_size,
            |b, &block_size| {
                let mut analyzer =
                    GainAnalyzer::with_config(AnalyzerConfig::normalized()).unwrap();
                analyzer.initialize(sample_rate).unwrap();

                b.iter(|| {
                    for block in input.chunks(block_size) {
                        analyzer.analyze_mono(black_box(block)).unwrap();
                    }
                    black_box(analyzer.title_gain().unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_interleaved_i16(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_interleaved");
    let sample_rate = 44100;
    let interleaved: Vec<i16> = generate_test_signal(sample_rate, 1.0)
        .iter()
        .flat_map(|&s| {
            let s = (s * 32767.0) as i16;
            [s, s]
        })
        .collect();
    group.throughput(Throughput::Elements((interleaved.len() / 2) as u64));

    group.bench_function("i16_stereo_1s", |b| {
        let mut analyzer = GainAnalyzer::for_sample_rate(sample_rate).unwrap();
        b.iter(|| {
            analyzer
                .analyze_interleaved_i16(black_box(&interleaved), 2)
                .unwrap();
            black_box(analyzer.title_gain().unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sample_rates,
    bench_block_sizes,
    bench_interleaved_i16
);
criterion_main!(benches);
