//! Block-processing units built on the `dsp` primitives.
//!
//! Units own their state and output streams, read upstream streams, and are
//! computed once per cycle by the host (or a [`chain::Chain`]). Parameters are
//! scalars or streams; see [`node`] for the shared types.

/// Constant-Q band-pass filter bank.
pub mod bandsplit;
/// Ordered unit list driven once per cycle.
pub mod chain;
/// Pitch and gain conversions.
pub mod convert;
/// Direct FIR convolution with a user impulse.
pub mod convolve;
/// Denormal-protection noise.
pub mod denorm;
/// Two-input blend and N-input selector.
pub mod interp;
/// Synthesized impulse filters (windowed sinc, average, pulse, FM).
pub mod ir;
/// N-by-M mixing matrix with ramped gains.
pub mod mixer;
/// Phase-aligned Linkwitz-Riley band splits.
pub mod multiband;
/// Core traits and types shared by all units.
pub mod node;
/// Pan, ring pan and channel switch.
pub mod pan;
/// Integer-factor up/down sampling.
pub mod resample;
/// Freeverb reverberator.
pub mod reverb;
/// Range mapping with power curve.
pub mod scale;
/// Control signals with optional glide.
pub mod sig;
/// Stream reader with mul/add.
pub mod tap;

pub use node::{MulAdd, Param, Stream, Unit};
