use tracing::{debug, warn};

use crate::{
    dsp::crossover::CrossoverCascade,
    graph::node::{checked, checked_input, Param, Stream, Unit},
    AudioConfig, Result,
};

/*
Reconstructing Band Splits (FourBand, MultiBand)
================================================

Both units split the input with a cascade of Linkwitz-Riley crossovers and
phase-align the bands so that summing them gives back the input with a flat
magnitude response (only the phase is rotated). See `dsp::crossover` for
the filter maths.

FourBand:
---------
Three boundaries (`freq1`, `freq2`, `freq3`), each a scalar or a stream.
A streamed boundary is read once per block at its first sample; coefficients
are only recomputed when a boundary value actually changes.

    band 0: below freq1
    band 1: freq1 .. freq2
    band 2: freq2 .. freq3
    band 3: above freq3

MultiBand:
----------
2 to 16 bands. Boundaries default to a cubic spread between 20 Hz and 20 kHz,
dense in the lows and sparse in the highs:

    f_i = ((i + 1) / N)³ · (max - min) + min       i = 0 .. N-2

    N = 4:   332 Hz, 2517 Hz, 8449 Hz

`set_frequencies` replaces the layout with explicit boundaries.

Example usage:
  let split = FourBand::new(&config, &input)?;
  let lows = Tap::new(&config, &split.band(0))?;
*/

pub const FOURBAND_DEFAULTS: [f32; 3] = [150.0, 500.0, 2000.0];
pub const MULTIBAND_MIN_FREQ: f32 = 20.0;
pub const MULTIBAND_MAX_FREQ: f32 = 20_000.0;
pub const MIN_BANDS: usize = 2;
pub const MAX_BANDS: usize = 16;

/// Cascade plus per-band block buffers shared by both units.
struct SplitCore {
    cascade: CrossoverCascade,
    sample_rate: f32,
    block_size: usize,
    scratch: Vec<Vec<f32>>,
    frame: Vec<f64>,
    outputs: Vec<Stream>,
}

impl SplitCore {
    fn new(boundaries: usize, sample_rate: f32, block_size: usize) -> Self {
        let bands = boundaries + 1;
        Self {
            cascade: CrossoverCascade::new(boundaries, sample_rate as f64),
            sample_rate,
            block_size,
            scratch: vec![vec![0.0; block_size]; bands],
            frame: vec![0.0; bands],
            outputs: (0..bands).map(|_| Stream::new(block_size)).collect(),
        }
    }

    /// Rebuild for a new boundary count; existing band streams are kept.
    fn resize(&mut self, boundaries: usize) {
        let bands = boundaries + 1;
        self.cascade = CrossoverCascade::new(boundaries, self.sample_rate as f64);
        self.scratch.resize(bands, vec![0.0; self.block_size]);
        self.frame.resize(bands, 0.0);
        while self.outputs.len() < bands {
            self.outputs.push(Stream::new(self.block_size));
        }
        self.outputs.truncate(bands);
    }

    fn update(&mut self, bound: usize, freq: f32) {
        if self.cascade.update(bound, freq as f64) {
            debug!(bound, freq, "crossover coefficients rebuilt");
        }
    }

    fn process(&mut self, input: &Stream) {
        let input = input.read();
        for (j, &x) in input[..self.block_size].iter().enumerate() {
            self.cascade.process(x as f64, &mut self.frame);
            for (band, &y) in self.scratch.iter_mut().zip(self.frame.iter()) {
                band[j] = y as f32;
            }
        }
        for (out, band) in self.outputs.iter().zip(self.scratch.iter()) {
            out.copy_from(band);
        }
    }
}

/// Four phase-aligned bands split at three boundary frequencies.
pub struct FourBand {
    input: Stream,
    freqs: [Param; 3],
    core: SplitCore,
}

impl FourBand {
    pub fn new(config: &AudioConfig, input: &Stream) -> Result<Self> {
        config.validate()?;
        let input = checked_input(input, config.block_size)?;
        Ok(Self {
            input,
            freqs: FOURBAND_DEFAULTS.map(Param::Scalar),
            core: SplitCore::new(3, config.sample_rate, config.block_size),
        })
    }

    /// Output stream of band `i`, lowest band first.
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    pub fn band(&self, i: usize) -> Stream {
        self.core.outputs[i].clone()
    }

    pub fn set_freq1(&mut self, freq: impl Into<Param>) -> Result<()> {
        self.set_freq(0, freq)
    }

    pub fn set_freq2(&mut self, freq: impl Into<Param>) -> Result<()> {
        self.set_freq(1, freq)
    }

    pub fn set_freq3(&mut self, freq: impl Into<Param>) -> Result<()> {
        self.set_freq(2, freq)
    }

    fn set_freq(&mut self, bound: usize, freq: impl Into<Param>) -> Result<()> {
        self.freqs[bound] = checked(freq, self.core.block_size)?;
        Ok(())
    }
}

impl Unit for FourBand {
    fn compute_next_block(&mut self) {
        for (bound, freq) in self.freqs.iter().enumerate() {
            self.core.update(bound, freq.first());
        }
        self.core.process(&self.input);
    }

    fn output(&self) -> Stream {
        self.band(0)
    }

    fn reset(&mut self) {
        self.core.cascade.reset();
    }
}

/// 2..16 phase-aligned bands.
pub struct MultiBand {
    input: Stream,
    freqs: Vec<f32>,
    core: SplitCore,
}

impl MultiBand {
    pub fn new(config: &AudioConfig, input: &Stream, bands: usize) -> Result<Self> {
        config.validate()?;
        let input = checked_input(input, config.block_size)?;
        let bands = clamp_bands(bands);
        Ok(Self {
            input,
            freqs: default_boundaries(bands),
            core: SplitCore::new(bands - 1, config.sample_rate, config.block_size),
        })
    }

    pub fn bands(&self) -> usize {
        self.freqs.len() + 1
    }

    /// Current boundary frequencies, ascending.
    pub fn frequencies(&self) -> &[f32] {
        &self.freqs
    }

    /// Output stream of band `i`, lowest band first.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.bands()`.
    pub fn band(&self, i: usize) -> Stream {
        self.core.outputs[i].clone()
    }

    /// Switch to the default cubic layout for `bands` bands.
    pub fn set_bands(&mut self, bands: usize) {
        let bands = clamp_bands(bands);
        self.freqs = default_boundaries(bands);
        self.core.resize(bands - 1);
    }

    /// Use explicit boundaries. They are sorted and clamped to the audible
    /// range; at most 15 are kept.
    pub fn set_frequencies(&mut self, freqs: &[f32]) {
        if freqs.is_empty() {
            warn!("MultiBand needs at least one boundary, keeping current layout");
            return;
        }
        let mut freqs: Vec<f32> = freqs
            .iter()
            .map(|f| f.clamp(MULTIBAND_MIN_FREQ, MULTIBAND_MAX_FREQ))
            .collect();
        freqs.sort_by(f32::total_cmp);
        if freqs.len() > MAX_BANDS - 1 {
            warn!(
                requested = freqs.len(),
                "too many MultiBand boundaries, keeping the lowest 15"
            );
            freqs.truncate(MAX_BANDS - 1);
        }
        if freqs.len() != self.freqs.len() {
            self.core.resize(freqs.len());
        }
        self.freqs = freqs;
    }
}

fn clamp_bands(bands: usize) -> usize {
    let clamped = bands.clamp(MIN_BANDS, MAX_BANDS);
    if clamped != bands {
        warn!(requested = bands, used = clamped, "MultiBand band count out of range");
    }
    clamped
}

fn default_boundaries(bands: usize) -> Vec<f32> {
    let span = MULTIBAND_MAX_FREQ - MULTIBAND_MIN_FREQ;
    (0..bands - 1)
        .map(|i| {
            let frac = (i + 1) as f32 / bands as f32;
            frac * frac * frac * span + MULTIBAND_MIN_FREQ
        })
        .collect()
}

impl Unit for MultiBand {
    fn compute_next_block(&mut self) {
        for (bound, &freq) in self.freqs.iter().enumerate() {
            self.core.update(bound, freq);
        }
        self.core.process(&self.input);
    }

    fn output(&self) -> Stream {
        self.band(0)
    }

    fn reset(&mut self) {
        self.core.cascade.reset();
    }
}
