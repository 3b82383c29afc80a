//! Error types for saavy_ugen

use thiserror::Error;

/// Errors surfaced when constructing or rebinding a unit.
///
/// Nothing in the per-block path returns an error: out-of-range audio
/// parameters are clamped instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    #[error("invalid block size: {0} (must be 1..={max})", max = crate::MAX_BLOCK_SIZE)]
    InvalidBlockSize(usize),

    #[error("stream length {got} does not match block size {expected}")]
    StreamLength { expected: usize, got: usize },

    #[error("impulse response must contain at least one tap")]
    EmptyImpulse,

    #[error("invalid resample factor {0} (must be at least 1 and divide the block size when downsampling)")]
    InvalidFactor(usize),

    #[error("{0} needs at least one input")]
    NoInputs(&'static str),

    #[error("{0} needs at least one output channel")]
    NoChannels(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
