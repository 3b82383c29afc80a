//! Low-level DSP primitives used by the graph units.
//!
//! These components hold only plain arrays and scalars and never allocate in
//! their per-sample paths, so units can embed them directly. They stay focused
//! on the signal-processing math; the `graph` units layer parameter dispatch,
//! shared streams and block scheduling on top.

/// Constant-Q band-pass biquads.
pub mod biquad;
/// Linkwitz-Riley crossover cascades with all-pass phase alignment.
pub mod crossover;
/// Ring buffer and direct convolution.
pub mod delay;
/// Impulse response synthesis (windowed sinc, pulse trains, FM bursts).
pub mod impulse;
/// Equal-power and linear crossfade laws.
pub mod mix;
/// Speaker gain laws for panning and switching.
pub mod pan;
/// Pitch and gain conversions.
pub mod pitch;
/// Polyphase filter for integer-factor resampling.
pub mod polyphase;
/// Linear parameter ramps.
pub mod ramp;
/// Freeverb comb and all-pass network.
pub mod reverb;
/// Blackman window lookup table.
pub mod window;

pub use delay::DelayLine;
pub use ramp::Ramp;
