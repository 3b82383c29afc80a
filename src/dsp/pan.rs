//! Speaker gain laws for the panning and switching units.

use std::f32::consts::TAU;

use crate::dsp::mix::{crossfade_gains, PanLaw};

/*
Panning Laws
============

Every function here fills one gain per output channel for a single control
position. The units call them once per block (scalar position) or once per
sample (streamed position).

Two channels
------------

Plain equal-power between left and right:

    left  = sqrt(1 - pan)
    right = sqrt(pan)

Adjacent-pair panning (SPan, Switch)
------------------------------------

The position selects two neighbouring channels and crossfades between them
with the equal-power law. SPan treats the speakers as a ring (position 1.0
wraps to channel 0); Switch treats them as a line and clamps at the ends.

    pan × N = 2.3      → channels 2 and 3, frac 0.3

Spread lobes (Pan with more than two speakers)
----------------------------------------------

Each speaker sits at phase j/N around a circle and gets a raised-cosine lobe
aimed at the pan position:

    gain_j = (0.5 + 0.5·cos(2π·(pan - j/N)))^e,   e = 20 - 20·sqrt(spread) + 0.1

spread = 0 gives a sharp lobe (e ≈ 20, one speaker dominates), spread = 1
gives e = 0.1 and the signal bleeds into every speaker.
*/

/// Lobe exponent for a spread amount in [0, 1].
#[inline]
pub fn spread_exponent(spread: f32) -> f32 {
    20.0 - spread.clamp(0.0, 1.0).sqrt() * 20.0 + 0.1
}

/// Gains for `Pan`: equal-power stereo, or spread lobes for > 2 channels.
#[inline]
pub fn pan_gains(pan: f32, spread: f32, gains: &mut [f32]) {
    let pan = pan.clamp(0.0, 1.0);
    match gains.len() {
        0 => {}
        1 => gains[0] = 1.0,
        2 => {
            let (left, right) = crossfade_gains(PanLaw::EqualPower, pan);
            gains[0] = left;
            gains[1] = right;
        }
        n => {
            let exponent = spread_exponent(spread);
            for (j, gain) in gains.iter_mut().enumerate() {
                let phase = j as f32 / n as f32;
                *gain = (0.5 + 0.5 * (TAU * (pan - phase)).cos()).powf(exponent);
            }
        }
    }
}

/// Gains for `SPan`: equal-power between adjacent channels of a ring.
#[inline]
pub fn ring_gains(pan: f32, gains: &mut [f32]) {
    let n = gains.len();
    if n <= 2 {
        pan_gains(pan, 0.0, gains);
        return;
    }
    gains.fill(0.0);
    let position = pan.clamp(0.0, 1.0) * n as f32;
    let index = (position as usize).min(n);
    let frac = position - index as f32;
    let (a, b) = crossfade_gains(PanLaw::EqualPower, frac);
    gains[index % n] += a;
    gains[(index + 1) % n] += b;
}

/// Gains for `Switch`: equal-power between adjacent channels of a line.
#[inline]
pub fn line_gains(voice: f32, gains: &mut [f32]) {
    let n = gains.len();
    if n == 0 {
        return;
    }
    gains.fill(0.0);
    let voice = voice.clamp(0.0, (n - 1) as f32);
    let index = voice as usize;
    let frac = voice - index as f32;
    if index + 1 >= n {
        gains[n - 1] = 1.0;
        return;
    }
    let (a, b) = crossfade_gains(PanLaw::EqualPower, frac);
    gains[index] = a;
    gains[index + 1] = b;
}
