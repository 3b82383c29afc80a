//! Reverb - Freeverb Comb/All-pass Network
//!
//! Freeverb is the Schroeder/Moorer reverberator tuned by Jezar: eight
//! parallel damped comb filters build the dense tail, four series all-pass
//! stages diffuse it.
//!
//! # Architecture
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→    ...   ──┼──→ (+) ──→ [AP 1] ──→ [AP 2] ──→ [AP 3] ──→ [AP 4] ──→ Wet
//!         └──→ [Comb 8] ──┘
//! ```
//!
//! ## Damped Comb
//!
//! Each comb has a one-pole low-pass inside its feedback path, so high
//! frequencies die away faster than lows, like a real room:
//!
//! ```text
//! tap    = ring[cursor]
//! state  = tap + (state - tap) * damp
//! ring[cursor] = input + state * feedback
//! ```
//!
//! ## All-pass
//!
//! Freeverb's all-pass uses a fixed 0.5 coefficient:
//!
//! ```text
//! y            = ring[cursor] - x
//! ring[cursor] = ring[cursor] * 0.5 + x
//! ```
//!
//! # Tuning
//!
//! Delay lengths are the classic 44.1 kHz values, scaled to the running
//! sample rate. One random jitter (10..30 samples at 44.1 kHz) is added to
//! every length, drawn once per instance, which keeps two reverbs in the same
//! patch from ringing at identical frequencies.

use crate::dsp::delay::DelayLine;

/// Comb lengths in samples at the reference rate.
pub const COMB_TUNING: [f32; 8] = [
    1116.0, 1188.0, 1277.0, 1356.0, 1422.0, 1491.0, 1557.0, 1617.0,
];
/// All-pass lengths in samples at the reference rate.
pub const ALLPASS_TUNING: [f32; 4] = [556.0, 441.0, 341.0, 225.0];
/// Rate the tuning tables were measured at.
pub const REFERENCE_RATE: f32 = 44_100.0;

/// Wet path gain, keeps eight summed combs in range.
pub const FIXED_GAIN: f32 = 0.015;
const SCALE_DAMP: f32 = 0.5;
const SCALE_ROOM: f32 = 0.28;
const OFFSET_ROOM: f32 = 0.7;

/// Jitter range in reference-rate samples.
pub const JITTER_MIN: f32 = 10.0;
pub const JITTER_SPAN: f32 = 20.0;

/// Comb feedback for a room size in [0, 1].
#[inline]
pub fn room_feedback(size: f32) -> f32 {
    size.clamp(0.0, 1.0) * SCALE_ROOM + OFFSET_ROOM
}

/// Low-pass coefficient for a damping amount in [0, 1].
#[inline]
pub fn damp_coef(damp: f32) -> f32 {
    damp.clamp(0.0, 1.0) * SCALE_DAMP
}

/// Delay length at `sample_rate` for a reference-rate tuning plus jitter.
#[inline]
pub fn scaled_length(tuning: f32, jitter: f32, sample_rate: f32) -> usize {
    (((tuning + jitter) / REFERENCE_RATE) * sample_rate)
        .round()
        .max(1.0) as usize
}

/// Feedback comb with one-pole damping.
#[derive(Debug, Clone)]
pub struct CombFilter {
    line: DelayLine,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            line: DelayLine::new(delay_samples),
            filter_state: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    #[inline]
    pub fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let tap = self.line.tap();
        self.filter_state = tap + (self.filter_state - tap) * damp;
        self.line.write_advance(input + self.filter_state * feedback);
        tap
    }

    pub fn reset(&mut self) {
        self.line.reset();
        self.filter_state = 0.0;
    }
}

/// Freeverb all-pass diffuser.
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    line: DelayLine,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            line: DelayLine::new(delay_samples),
        }
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let tap = self.line.tap();
        self.line.write_advance(tap * 0.5 + input);
        tap - input
    }

    pub fn reset(&mut self) {
        self.line.reset();
    }
}

/// The wet path of Freeverb: eight combs into four all-passes.
#[derive(Debug, Clone)]
pub struct FreeverbCore {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
    jitter: f32,
}

impl FreeverbCore {
    /// Build the network for `sample_rate` with a jitter in reference-rate
    /// samples.
    pub fn new(sample_rate: f32, jitter: f32) -> Self {
        Self {
            combs: COMB_TUNING.map(|t| CombFilter::new(scaled_length(t, jitter, sample_rate))),
            allpasses: ALLPASS_TUNING
                .map(|t| AllpassFilter::new(scaled_length(t, jitter, sample_rate))),
            jitter,
        }
    }

    pub fn jitter(&self) -> f32 {
        self.jitter
    }

    pub fn comb_lengths(&self) -> [usize; 8] {
        std::array::from_fn(|i| self.combs[i].len())
    }

    pub fn allpass_lengths(&self) -> [usize; 4] {
        std::array::from_fn(|i| self.allpasses[i].len())
    }

    /// Render the unscaled wet signal for one block.
    ///
    /// `feedback(i)` and `damp(i)` give the coefficients for sample `i`;
    /// callers pass constant closures when the parameter isn't streamed. The
    /// loop order (comb-major, then all-pass-major) is the same either way,
    /// so a constant stream reproduces the scalar result exactly.
    #[inline]
    pub fn process_block(
        &mut self,
        input: &[f32],
        wet: &mut [f32],
        feedback: impl Fn(usize) -> f32,
        damp: impl Fn(usize) -> f32,
    ) {
        debug_assert_eq!(input.len(), wet.len());
        wet.fill(0.0);

        for comb in &mut self.combs {
            for (i, (&x, w)) in input.iter().zip(wet.iter_mut()).enumerate() {
                *w += comb.process(x, feedback(i), damp(i));
            }
        }

        for allpass in &mut self.allpasses {
            for w in wet.iter_mut() {
                *w = allpass.process(*w);
            }
        }
    }

    /// Zero every ring and damping state. Lengths and jitter are kept.
    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}
