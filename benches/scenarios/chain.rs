//! Four-band multiband processing: split, per-band gain, reverb on the mids,
//! mix back to stereo.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_ugen::graph::{
    chain::Chain, mixer::Mixer, multiband::FourBand, reverb::Freeverb, tap::Tap, Stream,
};
use saavy_ugen::{AudioConfig, SeedRegistry};

use crate::BLOCK_SIZES;

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");

    for &size in BLOCK_SIZES {
        let config = AudioConfig::default()
            .with_sample_rate(48_000.0)
            .with_block_size(size);
        let samples: Vec<f32> = (0..size).map(|i| (i as f32 * 0.031).sin()).collect();
        let input = Stream::from_slice(&samples);
        let mut seeds = SeedRegistry::default();

        let mut chain = Chain::new();
        let split = FourBand::new(&config, &input).unwrap();
        let bands: Vec<Stream> = (0..4).map(|i| split.band(i)).collect();
        chain.push(split);

        let mut mixer = Mixer::new(&config, 2, 0.01).unwrap();
        for (i, band) in bands.iter().enumerate() {
            let mut tap = Tap::new(&config, band).unwrap();
            tap.set_mul(0.8).unwrap();
            let tapped = chain.push(tap);
            let source = if i == 1 || i == 2 {
                let reverb = Freeverb::new(&config, &tapped, 0.7, 0.4, 0.3, &mut seeds).unwrap();
                chain.push(reverb)
            } else {
                tapped
            };
            mixer.add_input(i, &source).unwrap();
            mixer.set_amp(&i, 0, 1.0);
            mixer.set_amp(&i, 1, 1.0);
        }
        let out = chain.push(mixer);

        group.bench_with_input(BenchmarkId::new("fourband_reverb_mix", size), &size, |b, _| {
            b.iter(|| {
                chain.process_block();
                black_box(out.read()[0]);
            })
        });
    }

    group.finish();
}
