use tracing::{debug, warn};

use crate::{
    dsp::biquad::{BandPassCoefs, BiquadState},
    graph::node::{checked, checked_input, Param, Stream, Unit},
    AudioConfig, Result,
};

/*
Constant-Q Band Splitter
========================

Splits one input into N band-passed copies. The centre frequencies are spaced
geometrically between `min` and `max`:

    f_i = min · (max / min)^(i / N)          i = 0 .. N-1

    N = 6, 20 Hz → 20 kHz:
      20   63   200   632   2000   6325 Hz

Every band uses the same Q, so each band is equally wide on a log axis. The
bands overlap; this is an analysis bank (vocoders, spectral gates, per-band
envelopes), not a reconstructing crossover. Use FourBand or MultiBand when the
bands need to sum back to the input.

Q modulation:
-------------
Scalar Q: coefficients are recomputed only when the value changes.
Stream Q: coefficients are recomputed for every sample. Filter memories are
never touched by a recompute.

The first block primes every memory with the first input sample, so an input
that starts on a DC offset doesn't kick the filters.

Bands are read with `band(i)` and typically fed through a `Tap`.
*/

pub struct BandSplitter {
    input: Stream,
    sample_rate: f32,
    block_size: usize,
    min_freq: f32,
    max_freq: f32,
    q: Param,
    // -1 forces a recompute on the next scalar block.
    last_q: f32,
    freqs: Vec<f32>,
    coefs: Vec<BandPassCoefs>,
    states: Vec<BiquadState>,
    primed: bool,
    outputs: Vec<Stream>,
}

impl BandSplitter {
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        bands: usize,
        min_freq: f32,
        max_freq: f32,
        q: impl Into<Param>,
    ) -> Result<Self> {
        config.validate()?;
        let input = checked_input(input, config.block_size)?;
        let q = checked(q, config.block_size)?;

        let mut splitter = Self {
            input,
            sample_rate: config.sample_rate,
            block_size: config.block_size,
            min_freq,
            max_freq,
            q,
            last_q: -1.0,
            freqs: Vec::new(),
            coefs: Vec::new(),
            states: Vec::new(),
            primed: false,
            outputs: Vec::new(),
        };
        splitter.set_bands(bands);
        Ok(splitter)
    }

    /// Centre frequency of band `i` out of `bands`.
    pub fn centre_freq(min_freq: f32, max_freq: f32, i: usize, bands: usize) -> f32 {
        min_freq * (max_freq / min_freq).powf(i as f32 / bands as f32)
    }

    pub fn bands(&self) -> usize {
        self.freqs.len()
    }

    pub fn freqs(&self) -> &[f32] {
        &self.freqs
    }

    /// Output stream of band `i`, lowest band first.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.bands()`.
    pub fn band(&self, i: usize) -> Stream {
        self.outputs[i].clone()
    }

    pub fn set_q(&mut self, q: impl Into<Param>) -> Result<()> {
        self.q = checked(q, self.block_size)?;
        self.last_q = -1.0;
        Ok(())
    }

    /// Change the band count. Existing band streams stay valid.
    pub fn set_bands(&mut self, bands: usize) {
        let bands = if bands < 1 {
            warn!(requested = bands, "BandSplitter needs at least one band, using 1");
            1
        } else {
            bands
        };
        self.coefs.resize(bands, BandPassCoefs::default());
        self.states.resize(bands, BiquadState::default());
        while self.outputs.len() < bands {
            self.outputs.push(Stream::new(self.block_size));
        }
        self.outputs.truncate(bands);
        self.rebuild_freqs(bands);
    }

    pub fn set_range(&mut self, min_freq: f32, max_freq: f32) {
        self.min_freq = min_freq;
        self.max_freq = max_freq;
        self.rebuild_freqs(self.freqs.len());
    }

    fn rebuild_freqs(&mut self, bands: usize) {
        self.freqs = (0..bands)
            .map(|i| Self::centre_freq(self.min_freq, self.max_freq, i, bands))
            .collect();
        self.last_q = -1.0;
        debug!(bands, min = self.min_freq, max = self.max_freq, "band splitter layout");
    }
}

impl Unit for BandSplitter {
    fn compute_next_block(&mut self) {
        let input = self.input.read();
        let input = &input[..self.block_size];

        if !self.primed {
            let first = input[0];
            self.states.iter_mut().for_each(|s| s.prime(first));
            self.primed = true;
        }

        match &self.q {
            Param::Scalar(q) => {
                let q = *q;
                if q != self.last_q {
                    for (c, &freq) in self.coefs.iter_mut().zip(self.freqs.iter()) {
                        *c = BandPassCoefs::new(freq, q, self.sample_rate);
                    }
                    self.last_q = q;
                }
                for ((state, c), out) in self
                    .states
                    .iter_mut()
                    .zip(self.coefs.iter())
                    .zip(self.outputs.iter())
                {
                    let mut out = out.write();
                    for (y, &x) in out.iter_mut().zip(input.iter()) {
                        *y = state.process(c, x);
                    }
                }
            }
            Param::Stream(q) => {
                let q = q.read();
                for (((state, c), &freq), out) in self
                    .states
                    .iter_mut()
                    .zip(self.coefs.iter_mut())
                    .zip(self.freqs.iter())
                    .zip(self.outputs.iter())
                {
                    let mut out = out.write();
                    for ((y, &x), &q) in out.iter_mut().zip(input.iter()).zip(q.iter()) {
                        *c = BandPassCoefs::new(freq, q, self.sample_rate);
                        *y = state.process(c, x);
                    }
                }
                self.last_q = -1.0;
            }
        }
    }

    fn output(&self) -> Stream {
        self.band(0)
    }

    fn reset(&mut self) {
        self.states.iter_mut().for_each(BiquadState::reset);
        self.primed = false;
    }
}
