//! Polyphase windowed-sinc filter for integer-factor resampling.

use crate::dsp::delay::DelayLine;
use crate::dsp::impulse::{even_order, lowpass_sinc};

/*
Polyphase Resampling
====================

Upsampling by F inserts F - 1 zeros between input samples and low-passes the
result at the old Nyquist. Most of the filter's multiplies then hit zeros, so
the prototype is split into F shorter sub-filters:

    prototype h:  h0 h1 h2 h3 h4 h5 h6 h7 h8      (F = 3)

    phase 0:      h0       h3       h6
    phase 1:         h1       h4       h7
    phase 2:            h2       h5       h8

Each input sample produces F outputs, one per phase, each a short dot product
against the input history. The output is scaled by F to restore the energy
lost to the inserted zeros.

Downsampling runs the full prototype over the input and keeps every F-th
result, so the convolution is only evaluated at the kept points.

Prototype length is `factor × multiplier` (forced even, plus the centre tap);
a larger multiplier buys a steeper transition band.
*/

/// Prototype filter split into per-phase sub-filters.
#[derive(Debug, Clone)]
pub struct Polyphase {
    factor: usize,
    taps: Vec<f32>,
    phases: Vec<Vec<f32>>,
    up_history: DelayLine,
    down_history: DelayLine,
    pending: usize,
}

impl Polyphase {
    pub fn new(factor: usize, multiplier: usize) -> Self {
        let factor = factor.max(1);
        let order = even_order(factor * multiplier.max(1));
        let size = order + 1;

        // Cutoff at the low-rate Nyquist, expressed against a nominal high rate.
        let nominal_rate = 1000.0 * factor as f32;
        let mut taps = vec![0.0; size];
        lowpass_sinc(&mut taps, 500.0, nominal_rate);

        let phase_len = size.div_ceil(factor);
        let phases = (0..factor)
            .map(|p| {
                let mut phase: Vec<f32> = taps.iter().skip(p).step_by(factor).copied().collect();
                phase.resize(phase_len, 0.0);
                phase
            })
            .collect();

        Self {
            factor,
            taps,
            phases,
            up_history: DelayLine::new(phase_len),
            down_history: DelayLine::new(size),
            pending: 0,
        }
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Full prototype impulse.
    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    pub fn phase(&self, index: usize) -> &[f32] {
        &self.phases[index]
    }

    /// Push one low-rate sample and write `factor` high-rate samples to `out`.
    #[inline]
    pub fn upsample(&mut self, input: f32, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.factor);
        self.up_history.write_advance(input);
        let gain = self.factor as f32;
        for (sample, phase) in out.iter_mut().zip(self.phases.iter()) {
            *sample = self.up_history.dot_recent(phase) * gain;
        }
    }

    /// Push one high-rate sample; every `factor`-th push returns a low-rate
    /// sample.
    #[inline]
    pub fn downsample(&mut self, input: f32) -> Option<f32> {
        self.down_history.write_advance(input);
        self.pending += 1;
        if self.pending < self.factor {
            return None;
        }
        self.pending = 0;
        Some(self.down_history.dot_recent(&self.taps))
    }

    pub fn reset(&mut self) {
        self.up_history.reset();
        self.down_history.reset();
        self.pending = 0;
    }
}
