pub mod dsp;
pub mod graph; // Block-processing units built on the dsp primitives

mod config;
mod error;
mod seed;

pub use config::AudioConfig;
pub use error::{Error, Result};
pub use seed::SeedRegistry;

pub const MAX_BLOCK_SIZE: usize = 2048;
