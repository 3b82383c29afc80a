//! Benchmarks for real-world processing chains.

mod chain;

pub use chain::bench_chain;
