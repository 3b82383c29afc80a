//! Per-band spectrum summary.

use rustfft::{num_complex::Complex, FftPlanner};
use saavy_ugen::dsp::pitch::amp_to_db;
use saavy_ugen::dsp::window::{blackman, tap_position};

const FFT_SIZE: usize = 8192;

pub struct Summary {
    /// Frequency of the strongest bin.
    pub peak_freq: f32,
    /// RMS level of the whole signal in dB.
    pub rms_db: f32,
}

/// Analyse the last `FFT_SIZE` samples (past the filter settling time).
pub fn summarize(samples: &[f32], sample_rate: f32) -> Summary {
    let rms = if samples.is_empty() {
        0.0
    } else {
        (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
    };

    let n = FFT_SIZE.min(samples.len().next_power_of_two());
    if n < 2 || samples.len() < n {
        return Summary {
            peak_freq: 0.0,
            rms_db: amp_to_db(rms),
        };
    }

    let tail = &samples[samples.len() - n..];
    let mut buffer: Vec<Complex<f32>> = tail
        .iter()
        .enumerate()
        .map(|(i, &x)| Complex::new(x * blackman(tap_position(i, n)), 0.0))
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let peak_bin = buffer[..n / 2]
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.norm_sqr().total_cmp(&b.1.norm_sqr()))
        .map(|(i, _)| i)
        .unwrap_or(0);

    Summary {
        peak_freq: peak_bin as f32 * sample_rate / n as f32,
        rms_db: amp_to_db(rms),
    }
}
