//! Benchmarks for mixing and panning.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_ugen::graph::{mixer::Mixer, pan::Pan, Stream, Unit};
use saavy_ugen::AudioConfig;

use super::test_signal;
use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let config = AudioConfig::default()
            .with_sample_rate(48_000.0)
            .with_block_size(size);
        let input = test_signal(size);

        // 8 inputs into a stereo bus, gains mid-ramp
        let mut mixer = Mixer::new(&config, 2, 0.5).unwrap();
        for key in 0..8usize {
            mixer.add_input(key, &input).unwrap();
            mixer.set_amp(&key, key % 2, 0.5);
        }
        group.bench_with_input(BenchmarkId::new("mixer_8x2", size), &size, |b, _| {
            b.iter(|| {
                mixer.compute_next_block();
                black_box(mixer.channel(0));
            })
        });

        // Eight-speaker spread pan with a moving position
        let sweep: Vec<f32> = (0..size).map(|i| i as f32 / size as f32).collect();
        let position = Stream::from_slice(&sweep);
        let mut pan = Pan::new(&config, &input, 8, &position, 0.5).unwrap();
        group.bench_with_input(BenchmarkId::new("pan_8_audio_rate", size), &size, |b, _| {
            b.iter(|| {
                pan.compute_next_block();
                black_box(pan.channel(0));
            })
        });
    }

    group.finish();
}
