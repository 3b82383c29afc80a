use crate::{
    graph::node::{checked_input, MulAdd, Param, Stream, Unit},
    AudioConfig, Result,
};

/*
Stream Tap
==========

Multi-output units (band splitters, spatializers, the mixer) expose their
outputs as bare streams. A Tap reads one of them and gives it the usual
single-output surface: its own buffer plus mul/add.

    [FourBand] ──band(2)──→ [Tap, mul 0.5] ──→ ...

Taps are scheduled after their producer, like any other consumer.
*/

pub struct Tap {
    source: Stream,
    output: Stream,
    post: MulAdd,
}

impl Tap {
    pub fn new(config: &AudioConfig, source: &Stream) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source: checked_input(source, config.block_size)?,
            output: Stream::new(config.block_size),
            post: MulAdd::new(config.block_size),
        })
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for Tap {
    fn compute_next_block(&mut self) {
        let mut out = self.output.write();
        let len = out.len();
        out.copy_from_slice(&self.source.read()[..len]);
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }
}
