//! Impulse response synthesis for the convolution units.

use std::f32::consts::{PI, TAU};

use crate::dsp::window::{blackman, tap_position};

/*
Impulse Response Synthesis
==========================

Every synthesized impulse has an odd number of taps (size = order + 1 with an
even order), so there is always a centre tap and the response is symmetric:
a linear-phase FIR with a delay of order/2 samples.

Windowed Sinc
-------------

The ideal low-pass impulse is a sinc, infinitely long:

    h[n] = sin(w·n) / n        w = 2π·fc / sr,  h[0] = w

Truncating it causes ripple, so it is tapered by a Blackman window:

         ▲
         │        ╭╮
         │       ╭╯╰╮
         │  ╭╮  ╭╯  ╰╮  ╭╮
    ─────┼──╯╰──╯────╰──╯╰──────▶ n
         │

Spectral inversion turns a low-pass into a high-pass with the same cutoff:
negate every tap, then add 1 to the centre tap. The pair sums to a unit
impulse, which is an exact identity filter.

    band-reject = LP(freq - bw/2) + HP(freq + bw/2)
    band-pass   = spectral inversion of band-reject


Normalisation
-------------

Low-pass style impulses are scaled so their taps sum to 1 (unit DC gain).
Shapes whose taps cancel (alternating pulses, FM bursts) are scaled by the
sum of magnitudes instead. A zero sum skips the scaling altogether rather
than dividing by zero.
*/

/// Impulse topologies produced by [`winsinc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WinSincType {
    #[default]
    LowPass,
    HighPass,
    BandReject,
    BandPass,
}

/// Pulse-train shapes produced by [`pulse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseType {
    #[default]
    Pulse,
    SmoothPulse,
    OddPulse,
    SmoothOddPulse,
}

impl PulseType {
    fn is_odd(self) -> bool {
        matches!(self, Self::OddPulse | Self::SmoothOddPulse)
    }

    fn is_smooth(self) -> bool {
        matches!(self, Self::SmoothPulse | Self::SmoothOddPulse)
    }
}

/// Force a filter order to be even so `order + 1` taps have a centre.
#[inline]
pub fn even_order(order: usize) -> usize {
    if order % 2 != 0 {
        order + 1
    } else {
        order
    }
}

/// Clamp a frequency or bandwidth into [1, sr/2].
#[inline]
pub fn clamp_freq(freq: f32, sample_rate: f32) -> f32 {
    freq.clamp(1.0, sample_rate * 0.5)
}

/// Scale taps so they sum to one. Returns false (and leaves the taps alone)
/// when the sum is zero.
pub fn normalize_sum(taps: &mut [f32]) -> bool {
    let sum: f32 = taps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return false;
    }
    let inv = 1.0 / sum;
    taps.iter_mut().for_each(|t| *t *= inv);
    true
}

/// Scale taps so their magnitudes sum to one.
pub fn normalize_abs(taps: &mut [f32]) -> bool {
    let sum: f32 = taps.iter().map(|t| t.abs()).sum();
    if sum == 0.0 || !sum.is_finite() {
        return false;
    }
    let inv = 1.0 / sum;
    taps.iter_mut().for_each(|t| *t *= inv);
    true
}

/// Negate every tap and add one to the centre tap.
pub fn spectral_invert(taps: &mut [f32]) {
    taps.iter_mut().for_each(|t| *t = -*t);
    let centre = taps.len() / 2;
    if let Some(t) = taps.get_mut(centre) {
        *t += 1.0;
    }
}

/// Blackman-windowed sinc low-pass, normalised to unit DC gain.
pub fn lowpass_sinc(taps: &mut [f32], cutoff: f32, sample_rate: f32) {
    let size = taps.len();
    let half = (size / 2) as f32;
    let w = TAU * clamp_freq(cutoff, sample_rate) / sample_rate;

    for (i, tap) in taps.iter_mut().enumerate() {
        let n = i as f32 - half;
        let sinc = if n == 0.0 { w } else { (w * n).sin() / n };
        *tap = sinc * blackman(tap_position(i, size));
    }
    normalize_sum(taps);
}

/// Windowed-sinc impulse of the given topology.
///
/// `scratch` must be the same length as `taps`; it holds the high-pass half
/// of the band-reject construction.
pub fn winsinc(
    taps: &mut [f32],
    scratch: &mut [f32],
    kind: WinSincType,
    freq: f32,
    bandwidth: f32,
    sample_rate: f32,
) {
    debug_assert_eq!(taps.len(), scratch.len());
    let freq = clamp_freq(freq, sample_rate);
    let bandwidth = clamp_freq(bandwidth, sample_rate);

    match kind {
        WinSincType::LowPass => lowpass_sinc(taps, freq, sample_rate),
        WinSincType::HighPass => {
            lowpass_sinc(taps, freq, sample_rate);
            spectral_invert(taps);
        }
        WinSincType::BandReject | WinSincType::BandPass => {
            let low = clamp_freq(freq - bandwidth * 0.5, sample_rate);
            let high = clamp_freq(freq + bandwidth * 0.5, sample_rate);
            lowpass_sinc(taps, low, sample_rate);
            lowpass_sinc(scratch, high, sample_rate);
            spectral_invert(scratch);
            for (t, s) in taps.iter_mut().zip(scratch.iter()) {
                *t += *s;
            }
            if kind == WinSincType::BandPass {
                spectral_invert(taps);
            }
        }
    }
}

/// Blackman-windowed moving average, normalised to unit DC gain.
pub fn average(taps: &mut [f32]) {
    let size = taps.len();
    for (i, tap) in taps.iter_mut().enumerate() {
        *tap = blackman(tap_position(i, size));
    }
    normalize_sum(taps);
}

/// Windowed pulse train centred on the middle tap.
///
/// Pulses repeat every `sr / freq` samples and are `sr / bandwidth` samples
/// wide (never wider than one period). Odd shapes flip the sign of every
/// other pulse, which keeps only the odd harmonics of the fundamental.
pub fn pulse(taps: &mut [f32], kind: PulseType, freq: f32, bandwidth: f32, sample_rate: f32) {
    let size = taps.len();
    let half = (size / 2) as f32;
    let period = sample_rate / clamp_freq(freq, sample_rate);
    let width = (sample_rate / clamp_freq(bandwidth, sample_rate)).clamp(1.0, period);
    let half_width = width * 0.5;

    for (i, tap) in taps.iter_mut().enumerate() {
        let n = i as f32 - half;
        let index = (n / period).round();
        let offset = n - index * period;

        let shape = if offset.abs() > half_width {
            0.0
        } else if kind.is_smooth() {
            0.5 + 0.5 * (PI * offset / half_width).cos()
        } else {
            1.0
        };
        let sign = if kind.is_odd() && (index as i64) % 2 != 0 {
            -1.0
        } else {
            1.0
        };
        *tap = shape * sign * blackman(tap_position(i, size));
    }

    if kind.is_odd() {
        normalize_abs(taps);
    } else {
        normalize_sum(taps);
    }
}

/// Frequency-modulated sinusoidal burst under a raised-cosine envelope.
///
/// The phase is `2π·fc·t + index·sin(2π·fc·ratio·t)` with t measured from
/// the centre tap, so the burst is symmetric.
pub fn fm(taps: &mut [f32], carrier: f32, ratio: f32, index: f32, sample_rate: f32) {
    let size = taps.len();
    let half = (size / 2) as f32;
    let carrier = clamp_freq(carrier, sample_rate);
    let modulator = carrier * ratio.max(0.0);
    let index = index.max(0.0);

    for (i, tap) in taps.iter_mut().enumerate() {
        let t = (i as f32 - half) / sample_rate;
        let phase = TAU * carrier * t + index * (TAU * modulator * t).sin();
        let env = 0.5 - 0.5 * (TAU * tap_position(i, size)).cos();
        *tap = phase.cos() * env;
    }
    normalize_abs(taps);
}
