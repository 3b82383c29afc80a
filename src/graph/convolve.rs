use tracing::debug;

use crate::{
    dsp::delay::DelayLine,
    graph::node::{checked_input, MulAdd, Param, Stream, Unit},
    AudioConfig, Error, Result,
};

/*
Direct Convolution
==================

Convolve runs the input through an arbitrary FIR: a user-supplied impulse
response of N taps.

    y[n] = Σ_{k=0}^{N-1} x[n - k] · h[k]

The last N input samples live in a ring buffer. Each new sample is written at
the cursor and the ring is walked backwards against the impulse:

    ring:     x[n-2]  x[n-1]  x[n]  x[n-N+1] ...
                              ▲ cursor
    impulse:  h[0] pairs with x[n], h[1] with x[n-1], ...

This costs N multiply-adds per sample. It is meant for short impulses
(filters, small cabinet or body responses); there is no FFT path.

Example usage:
  let fir = Convolve::new(&config, &input, &[0.25, 0.5, 0.25])?;
*/

/// Ring, taps and output shared by every FIR unit.
pub(crate) struct FirCore {
    input: Stream,
    block_size: usize,
    pub(crate) taps: Vec<f32>,
    ring: DelayLine,
    output: Stream,
    pub(crate) post: MulAdd,
}

impl FirCore {
    pub(crate) fn new(config: &AudioConfig, input: &Stream, size: usize) -> Result<Self> {
        config.validate()?;
        let input = checked_input(input, config.block_size)?;
        Ok(Self {
            input,
            block_size: config.block_size,
            taps: vec![0.0; size],
            ring: DelayLine::new(size),
            output: Stream::new(config.block_size),
            post: MulAdd::new(config.block_size),
        })
    }

    /// Swap in a table of a different length, clearing the ring.
    pub(crate) fn resize(&mut self, size: usize) {
        self.taps.resize(size, 0.0);
        self.ring.resize(size);
    }

    pub(crate) fn run(&mut self) {
        let input = self.input.read();
        let mut out = self.output.write();
        for (y, &x) in out.iter_mut().zip(input[..self.block_size].iter()) {
            *y = self.ring.convolve(x, &self.taps);
        }
        self.post.apply(&mut out);
    }

    pub(crate) fn output(&self) -> Stream {
        self.output.clone()
    }

    pub(crate) fn reset(&mut self) {
        self.ring.reset();
    }
}

/// FIR filter with a user-supplied impulse response.
pub struct Convolve {
    core: FirCore,
}

impl Convolve {
    pub fn new(config: &AudioConfig, input: &Stream, impulse: &[f32]) -> Result<Self> {
        if impulse.is_empty() {
            return Err(Error::EmptyImpulse);
        }
        let mut core = FirCore::new(config, input, impulse.len())?;
        core.taps.copy_from_slice(impulse);
        debug!(taps = impulse.len(), "convolver created");
        Ok(Self { core })
    }

    pub fn impulse(&self) -> &[f32] {
        &self.core.taps
    }

    /// Replace the impulse. The ring is resized and cleared.
    pub fn set_impulse(&mut self, impulse: &[f32]) -> Result<()> {
        if impulse.is_empty() {
            return Err(Error::EmptyImpulse);
        }
        self.core.resize(impulse.len());
        self.core.taps.copy_from_slice(impulse);
        Ok(())
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.core.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.core.post.set_add(add)
    }
}

impl Unit for Convolve {
    fn compute_next_block(&mut self) {
        self.core.run();
    }

    fn output(&self) -> Stream {
        self.core.output()
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
