//! Blackman window lookup table.

use std::f32::consts::TAU;
use std::sync::OnceLock;

/// Number of points in the window table (a power of two plus the end point).
pub const WINDOW_TABLE_LEN: usize = 257;

static BLACKMAN: OnceLock<[f32; WINDOW_TABLE_LEN]> = OnceLock::new();

fn blackman_table() -> &'static [f32; WINDOW_TABLE_LEN] {
    BLACKMAN.get_or_init(|| {
        let mut table = [0.0; WINDOW_TABLE_LEN];
        let last = (WINDOW_TABLE_LEN - 1) as f32;
        for (i, value) in table.iter_mut().enumerate() {
            let phase = i as f32 / last;
            *value = 0.42 - 0.5 * (TAU * phase).cos() + 0.08 * (2.0 * TAU * phase).cos();
        }
        table
    })
}

/// Blackman window value at `position` in [0, 1], linearly interpolated
/// between table points.
#[inline]
pub fn blackman(position: f32) -> f32 {
    let table = blackman_table();
    let index = position.clamp(0.0, 1.0) * (WINDOW_TABLE_LEN - 1) as f32;
    let i = index as usize;
    if i >= WINDOW_TABLE_LEN - 1 {
        return table[WINDOW_TABLE_LEN - 1];
    }
    let frac = index - i as f32;
    table[i] + (table[i + 1] - table[i]) * frac
}

/// Window position of tap `index` in an impulse of `size` taps.
#[inline]
pub fn tap_position(index: usize, size: usize) -> f32 {
    if size <= 1 {
        0.5
    } else {
        index as f32 / (size - 1) as f32
    }
}
