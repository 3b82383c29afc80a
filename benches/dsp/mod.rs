//! Benchmarks for individual units.

mod convolve;
mod filter;
mod mix;
mod reverb;

pub use convolve::bench_convolve;
pub use filter::bench_filter;
pub use mix::bench_mix;
pub use reverb::bench_reverb;

use saavy_ugen::graph::Stream;

/// Sawtooth-like ramp used as bench input.
pub fn test_signal(size: usize) -> Stream {
    let samples: Vec<f32> = (0..size)
        .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
        .collect();
    Stream::from_slice(&samples)
}
