//! Benchmarks for reverb processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_ugen::graph::{reverb::Freeverb, Stream, Unit};
use saavy_ugen::{AudioConfig, SeedRegistry};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    let mut seeds = SeedRegistry::default();

    for &size in BLOCK_SIZES {
        let config = AudioConfig::default()
            .with_sample_rate(48_000.0)
            .with_block_size(size);

        // Generate a test signal (impulse-like with some content)
        let samples: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0) // Initial impulse
                } else {
                    (i as f32 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();
        let input = Stream::from_slice(&samples);

        // Small room (short reverb)
        let mut reverb = Freeverb::new(&config, &input, 0.3, 0.5, 0.5, &mut seeds).unwrap();
        group.bench_with_input(BenchmarkId::new("small_room", size), &size, |b, _| {
            b.iter(|| {
                reverb.compute_next_block();
                black_box(reverb.output());
            })
        });

        // Large room, all parameters streamed
        let size_stream = Stream::from_slice(&vec![0.9; size]);
        let damp_stream = Stream::from_slice(&vec![0.3; size]);
        let mix_stream = Stream::from_slice(&vec![0.5; size]);
        let mut reverb = Freeverb::new(
            &config,
            &input,
            &size_stream,
            &damp_stream,
            &mix_stream,
            &mut seeds,
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("large_room_audio_rate", size), &size, |b, _| {
            b.iter(|| {
                reverb.compute_next_block();
                black_box(reverb.output());
            })
        });
    }

    group.finish();
}
