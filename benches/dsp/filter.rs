//! Benchmarks for the band-splitting filter banks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_ugen::graph::{
    bandsplit::BandSplitter,
    multiband::{FourBand, MultiBand},
    Stream, Unit,
};
use saavy_ugen::AudioConfig;

use super::test_signal;
use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let config = AudioConfig::default()
            .with_sample_rate(48_000.0)
            .with_block_size(size);
        let input = test_signal(size);

        // Constant-Q bank, scalar Q (coefficients cached)
        let mut splitter = BandSplitter::new(&config, &input, 8, 40.0, 16_000.0, 2.0).unwrap();
        group.bench_with_input(BenchmarkId::new("bandsplit_8", size), &size, |b, _| {
            b.iter(|| {
                splitter.compute_next_block();
                black_box(splitter.band(0));
            })
        });

        // Constant-Q bank, streamed Q (coefficients per sample)
        let q = Stream::from_slice(&vec![2.0; size]);
        let mut splitter = BandSplitter::new(&config, &input, 8, 40.0, 16_000.0, &q).unwrap();
        group.bench_with_input(BenchmarkId::new("bandsplit_8_audio_q", size), &size, |b, _| {
            b.iter(|| {
                splitter.compute_next_block();
                black_box(splitter.band(0));
            })
        });

        // Linkwitz-Riley four band
        let mut four = FourBand::new(&config, &input).unwrap();
        group.bench_with_input(BenchmarkId::new("fourband", size), &size, |b, _| {
            b.iter(|| {
                four.compute_next_block();
                black_box(four.band(0));
            })
        });

        // Linkwitz-Riley sixteen band (worst case alignment)
        let mut multi = MultiBand::new(&config, &input, 16).unwrap();
        group.bench_with_input(BenchmarkId::new("multiband_16", size), &size, |b, _| {
            b.iter(|| {
                multi.compute_next_block();
                black_box(multi.band(0));
            })
        });
    }

    group.finish();
}
