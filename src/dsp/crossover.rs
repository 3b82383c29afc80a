//! Linkwitz-Riley crossover cascade used by the multi-band splitters.

use std::f64::consts::{PI, SQRT_2, TAU};

/*
Linkwitz-Riley Crossovers
=========================

A Linkwitz-Riley 4th-order (LR4) crossover is two 2nd-order Butterworth
filters in series. Its low-pass and high-pass halves share one denominator:

    LP(s) = wc⁴ / (s² + √2·wc·s + wc²)²
    HP(s) = s⁴  / (s² + √2·wc·s + wc²)²

Their sum is an all-pass: unit magnitude at every frequency, with a phase
rotation centred on the crossover frequency.

    LP + HP = (s² - √2·wc·s + wc²) / (s² + √2·wc·s + wc²)

Bilinear transform with prewarping (k = wc / tan(π·f/sr)) turns this into
a 4th-order difference equation. Both halves use the same b1..b4 feedback
terms; only the feed-forward taps differ:

    LP taps: wc⁴/a · [1,  4, 6,  4, 1]
    HP taps: k⁴/a  · [1, -4, 6, -4, 1]


Splitting Into N Bands
----------------------

Bands are peeled off from the bottom, one boundary at a time:

    x ──┬─ LP₀ ──────────────────────────────→ band 0
        └─ HP₀ ──┬─ LP₁ ─────────────────────→ band 1
                 └─ HP₁ ──┬─ LP₂ ────────────→ band 2
                          └─ HP₂ ────────────→ band 3

Each split rotates the phase of everything that continues upward. Band 0
never saw LP₁/HP₁ or LP₂/HP₂, so summing the bands as drawn gives phase
cancellation around the upper crossovers.

The fix is to push every band that was split off early through the
all-pass equivalent (LP + HP) of every boundary above it:

    band 0 ── AP₁ ── AP₂
    band 1 ── AP₂
    band 2, band 3 untouched

Band i therefore gets (boundaries - i - 1) correction passes, applied in the
order `for bound { for align in bound+1..boundaries }`. After correction the
sum of all bands equals AP_{B-1} ∘ … ∘ AP₀ applied to the input: a pure
phase shift with flat magnitude.

All of this runs in f64. Low crossover frequencies put the LR4 poles very
close to the unit circle and f32 state drifts audibly there.
*/

/// Shared denominator plus low/high feed-forward taps for one boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lr4Coefs {
    b1: f64,
    b2: f64,
    b3: f64,
    b4: f64,
    la0: f64,
    la1: f64,
    la2: f64,
    ha0: f64,
    ha1: f64,
    ha2: f64,
}

impl Lr4Coefs {
    pub fn new(freq: f64, sample_rate: f64) -> Self {
        let freq = freq.clamp(1.0, sample_rate / 2.01);
        let wc = TAU * freq;
        let wc2 = wc * wc;
        let wc3 = wc2 * wc;
        let wc4 = wc2 * wc2;
        let k = wc / (PI * freq / sample_rate).tan();
        let k2 = k * k;
        let k3 = k2 * k;
        let k4 = k2 * k2;
        let sq_tmp1 = SQRT_2 * wc3 * k;
        let sq_tmp2 = SQRT_2 * wc * k3;
        let a_tmp = 4.0 * wc2 * k2 + 2.0 * sq_tmp1 + k4 + 2.0 * sq_tmp2 + wc4;
        let wc4_a = wc4 / a_tmp;
        let k4_a = k4 / a_tmp;

        Self {
            b1: (4.0 * (wc4 + sq_tmp1 - k4 - sq_tmp2)) / a_tmp,
            b2: (6.0 * wc4 - 8.0 * wc2 * k2 + 6.0 * k4) / a_tmp,
            b3: (4.0 * (wc4 - sq_tmp1 + sq_tmp2 - k4)) / a_tmp,
            b4: (k4 - 2.0 * sq_tmp1 + wc4 - 2.0 * sq_tmp2 + 4.0 * wc2 * k2) / a_tmp,
            la0: wc4_a,
            la1: 4.0 * wc4_a,
            la2: 6.0 * wc4_a,
            ha0: k4_a,
            ha1: -4.0 * k4_a,
            ha2: 6.0 * k4_a,
        }
    }
}

/// Memory of one 4th-order section.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lr4State {
    x: [f64; 4],
    y: [f64; 4],
}

impl Lr4State {
    #[inline]
    fn tick(&mut self, c: &Lr4Coefs, a0: f64, a1: f64, a2: f64, input: f64) -> f64 {
        let [x1, x2, x3, x4] = self.x;
        let [y1, y2, y3, y4] = self.y;
        let out = a0 * input + a1 * x1 + a2 * x2 + a1 * x3 + a0 * x4
            - c.b1 * y1
            - c.b2 * y2
            - c.b3 * y3
            - c.b4 * y4;
        self.x = [input, x1, x2, x3];
        self.y = [out, y1, y2, y3];
        out
    }

    #[inline]
    pub fn lowpass(&mut self, c: &Lr4Coefs, input: f64) -> f64 {
        self.tick(c, c.la0, c.la1, c.la2, input)
    }

    #[inline]
    pub fn highpass(&mut self, c: &Lr4Coefs, input: f64) -> f64 {
        // The odd high-pass taps are negative: [ha0, ha1, ha2, ha1, ha0].
        self.tick(c, c.ha0, c.ha1, c.ha2, input)
    }
}

/// Low/high pair that together form the all-pass equivalent of a boundary.
#[derive(Debug, Clone, Copy, Default)]
struct AllpassPair {
    low: Lr4State,
    high: Lr4State,
}

impl AllpassPair {
    #[inline]
    fn process(&mut self, c: &Lr4Coefs, input: f64) -> f64 {
        self.low.lowpass(c, input) + self.high.highpass(c, input)
    }
}

/// Cascade of LR4 splits with phase alignment between bands.
#[derive(Debug, Clone)]
pub struct CrossoverCascade {
    sample_rate: f64,
    coefs: Vec<Lr4Coefs>,
    // -1 until the first update, forcing a recompute.
    last_freqs: Vec<f64>,
    split_low: Vec<Lr4State>,
    split_high: Vec<Lr4State>,
    // align[bound][align - bound - 1]
    align: Vec<Vec<AllpassPair>>,
}

impl CrossoverCascade {
    pub fn new(boundaries: usize, sample_rate: f64) -> Self {
        Self {
            sample_rate,
            coefs: vec![Lr4Coefs::default(); boundaries],
            last_freqs: vec![-1.0; boundaries],
            split_low: vec![Lr4State::default(); boundaries],
            split_high: vec![Lr4State::default(); boundaries],
            align: (0..boundaries)
                .map(|bound| vec![AllpassPair::default(); boundaries - bound - 1])
                .collect(),
        }
    }

    pub fn boundaries(&self) -> usize {
        self.coefs.len()
    }

    pub fn bands(&self) -> usize {
        self.coefs.len() + 1
    }

    /// Recompute coefficients for `bound` if `freq` differs from the cached
    /// value. Returns true when a recompute happened.
    pub fn update(&mut self, bound: usize, freq: f64) -> bool {
        if freq == self.last_freqs[bound] {
            return false;
        }
        self.last_freqs[bound] = freq;
        self.coefs[bound] = Lr4Coefs::new(freq, self.sample_rate);
        true
    }

    /// Split one input sample into `bands()` phase-aligned outputs.
    #[inline]
    pub fn process(&mut self, input: f64, bands: &mut [f64]) {
        let boundaries = self.coefs.len();
        debug_assert_eq!(bands.len(), boundaries + 1);

        let mut rest = input;
        for bound in 0..boundaries {
            let c = &self.coefs[bound];
            bands[bound] = self.split_low[bound].lowpass(c, rest);
            rest = self.split_high[bound].highpass(c, rest);
        }
        bands[boundaries] = rest;

        for bound in 0..boundaries {
            for align in (bound + 1)..boundaries {
                let pair = &mut self.align[bound][align - bound - 1];
                bands[bound] = pair.process(&self.coefs[align], bands[bound]);
            }
        }
    }

    pub fn reset(&mut self) {
        self.split_low.fill(Lr4State::default());
        self.split_high.fill(Lr4State::default());
        for pairs in &mut self.align {
            pairs.fill(AllpassPair::default());
        }
    }
}
