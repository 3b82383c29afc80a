//! Constant-Q band-pass biquad used by the band splitter.

use std::f32::consts::TAU;

/*
Band-Pass Biquad
================

A biquad is a 2nd-order recursive filter: every output sample is built from
the current input, the previous two inputs and the previous two outputs.

    y[n] = (b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]) / a0

For the constant-Q band-pass (RBJ cookbook, "constant 0 dB peak gain"):

    w0    = 2π · f / sr
    alpha = sin(w0) / (2·Q)

    b0 =  alpha       a0 = 1 + alpha
    b1 =  0           a1 = -2·cos(w0)
    b2 = -alpha       a2 = 1 - alpha

b1 is always zero so it is dropped, and a0 is stored as its reciprocal so the
per-sample path multiplies instead of divides.

Near Nyquist the coefficients lose precision and the filter can ring, so the
centre frequency is clamped to [1, sr / 2.01].
*/

/// Lowest Q accepted before coefficients are computed.
pub const MIN_Q: f32 = 0.1;

/// Coefficients of one band-pass section.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandPassCoefs {
    pub b0: f32,
    pub b2: f32,
    /// Reciprocal of the a0 term.
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BandPassCoefs {
    pub fn new(freq: f32, q: f32, sample_rate: f32) -> Self {
        let freq = clamp_band_freq(freq, sample_rate);
        let q = q.max(MIN_Q);
        let w0 = TAU * freq / sample_rate;
        let alpha = w0.sin() / (2.0 * q);

        Self {
            b0: alpha,
            b2: -alpha,
            a0: 1.0 / (1.0 + alpha),
            a1: -2.0 * w0.cos(),
            a2: 1.0 - alpha,
        }
    }
}

/// Clamp a centre frequency into the stable region of the band-pass.
#[inline]
pub fn clamp_band_freq(freq: f32, sample_rate: f32) -> f32 {
    freq.clamp(1.0, sample_rate / 2.01)
}

/// Input/output memory of one biquad section.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiquadState {
    /// Fill every memory slot with `value` so a DC offset doesn't click.
    pub fn prime(&mut self, value: f32) {
        self.x1 = value;
        self.x2 = value;
        self.y1 = value;
        self.y2 = value;
    }

    #[inline]
    pub fn process(&mut self, c: &BandPassCoefs, x: f32) -> f32 {
        let y = (c.b0 * x + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2) * c.a0;
        self.y2 = self.y1;
        self.y1 = y;
        self.x2 = self.x1;
        self.x1 = x;
        y
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
