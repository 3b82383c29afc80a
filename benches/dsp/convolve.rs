//! Benchmarks for direct convolution.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_ugen::dsp::impulse::WinSincType;
use saavy_ugen::graph::{convolve::Convolve, ir::IrWinSinc, Unit};
use saavy_ugen::AudioConfig;

use super::test_signal;
use crate::BLOCK_SIZES;

pub fn bench_convolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolve");

    for &size in BLOCK_SIZES {
        let config = AudioConfig::default()
            .with_sample_rate(48_000.0)
            .with_block_size(size);
        let input = test_signal(size);

        for &taps in &[32usize, 256] {
            let impulse: Vec<f32> = (0..taps).map(|i| 1.0 / (i + 1) as f32).collect();
            let mut fir = Convolve::new(&config, &input, &impulse).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("convolve_{}", taps), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        fir.compute_next_block();
                        black_box(fir.output());
                    })
                },
            );
        }

        // Band-pass windowed sinc, impulse cached between blocks
        let mut winsinc =
            IrWinSinc::new(&config, &input, 1000.0, 200.0, WinSincType::BandPass, 256).unwrap();
        group.bench_with_input(BenchmarkId::new("winsinc_256", size), &size, |b, _| {
            b.iter(|| {
                winsinc.compute_next_block();
                black_box(winsinc.output());
            })
        });
    }

    group.finish();
}
