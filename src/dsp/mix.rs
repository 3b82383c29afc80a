//! Crossfade gain laws shared by the panning and selection units.

/*
Gain Laws
=========

Every unit that blends two things (Interp, Selector, SPan, Switch, the
Freeverb wet/dry stage) turns a position in [0, 1] into a pair of weights.

  position      0.0 → all of A, 1.0 → all of B. Out-of-range positions are
                clamped, so a modulating stream can overshoot safely.

  wet/dry       Freeverb's `mix`: wet = processed, dry = the input.


Linear vs Equal-Power
---------------------

LINEAR (Interp, and Selector with `PanLaw::Linear`):

    a = 1 - x
    b = x

    Amplitudes sum to 1. Uncorrelated sources lose about 3 dB at x = 0.5
    because power, not amplitude, is what adds.

EQUAL-POWER (default):

    a = sqrt(1 - x)
    b = sqrt(x)

    a² + b² = 1 at every position, so a moving pan or crossfade holds its
    loudness. At x = 0.5 both weights are √0.5 ≈ 0.707.

    x      a       b       a² + b²
    0.00   1.000   0.000   1.0
    0.25   0.866   0.500   1.0
    0.50   0.707   0.707   1.0
    0.75   0.500   0.866   1.0
    1.00   0.000   1.000   1.0
*/

/// Gain law used when blending between two signals or channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanLaw {
    #[default]
    EqualPower,
    Linear,
}

/// Weights `(a, b)` for a balance in [0, 1].
#[inline]
pub fn crossfade_gains(law: PanLaw, balance: f32) -> (f32, f32) {
    let balance = balance.clamp(0.0, 1.0);
    match law {
        PanLaw::EqualPower => ((1.0 - balance).sqrt(), balance.sqrt()),
        PanLaw::Linear => (1.0 - balance, balance),
    }
}

/// Equal-power `(wet, dry)` gains for a wet amount in [0, 1].
#[inline]
pub fn dry_wet_gains(mix: f32) -> (f32, f32) {
    let (dry, wet) = crossfade_gains(PanLaw::EqualPower, mix);
    (wet, dry)
}
