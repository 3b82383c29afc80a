use crate::{
    dsp::mix::{crossfade_gains, PanLaw},
    graph::node::{checked, checked_input, MulAdd, Param, Stream, Unit},
    AudioConfig, Error, Result,
};

/*
Crossfaders (Interp, Selector)
==============================

Interp blends two signals with a linear balance:

    out = a · (1 - interp) + b · interp          interp clipped to [0, 1]

Selector generalises this to N inputs. The `voice` position picks two
neighbouring inputs and crossfades between them:

    voice:   0.0       1.0       2.0       3.0
    input:   [0] ───── [1] ───── [2] ───── [3]
                          ▲ voice = 1.4 → 0.6·[1] + 0.4·[2] (linear)

The default law is equal-power (sqrt(1-f), sqrt(f)), which keeps the level
steady when the inputs are uncorrelated; linear is available for correlated
material such as different filterings of the same source.
*/

/// Linear blend of two signals.
pub struct Interp {
    a: Stream,
    b: Stream,
    interp: Param,
    block_size: usize,
    output: Stream,
    post: MulAdd,
}

impl Interp {
    pub fn new(
        config: &AudioConfig,
        a: &Stream,
        b: &Stream,
        interp: impl Into<Param>,
    ) -> Result<Self> {
        config.validate()?;
        let bs = config.block_size;
        Ok(Self {
            a: checked_input(a, bs)?,
            b: checked_input(b, bs)?,
            interp: checked(interp, bs)?,
            block_size: bs,
            output: Stream::new(bs),
            post: MulAdd::new(bs),
        })
    }

    pub fn set_interp(&mut self, interp: impl Into<Param>) -> Result<()> {
        self.interp = checked(interp, self.block_size)?;
        Ok(())
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for Interp {
    fn compute_next_block(&mut self) {
        let (a, b) = (self.a.read(), self.b.read());
        let mut out = self.output.write();
        match &self.interp {
            Param::Scalar(t) => {
                let (ga, gb) = crossfade_gains(PanLaw::Linear, *t);
                for ((y, &a), &b) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
                    *y = a * ga + b * gb;
                }
            }
            Param::Stream(t) => {
                let t = t.read();
                for (((y, &a), &b), &t) in out.iter_mut().zip(a.iter()).zip(b.iter()).zip(t.iter())
                {
                    let (ga, gb) = crossfade_gains(PanLaw::Linear, t);
                    *y = a * ga + b * gb;
                }
            }
        }
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }
}

/// Crossfade across N inputs by a continuous position.
pub struct Selector {
    inputs: Vec<Stream>,
    voice: Param,
    law: PanLaw,
    block_size: usize,
    output: Stream,
    post: MulAdd,
}

impl Selector {
    pub fn new(config: &AudioConfig, inputs: &[Stream], voice: impl Into<Param>) -> Result<Self> {
        config.validate()?;
        if inputs.is_empty() {
            return Err(Error::NoInputs("Selector"));
        }
        let bs = config.block_size;
        Ok(Self {
            inputs: inputs
                .iter()
                .map(|s| checked_input(s, bs))
                .collect::<Result<_>>()?,
            voice: checked(voice, bs)?,
            law: PanLaw::EqualPower,
            block_size: bs,
            output: Stream::new(bs),
            post: MulAdd::new(bs),
        })
    }

    pub fn set_voice(&mut self, voice: impl Into<Param>) -> Result<()> {
        self.voice = checked(voice, self.block_size)?;
        Ok(())
    }

    pub fn set_law(&mut self, law: PanLaw) {
        self.law = law;
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }

    /// Neighbouring input indices and their gains for `voice`.
    fn pick(&self, voice: f32) -> (usize, usize, f32, f32) {
        let last = self.inputs.len() - 1;
        let voice = voice.clamp(0.0, last as f32);
        let lower = (voice as usize).min(last);
        let upper = (lower + 1).min(last);
        let (ga, gb) = crossfade_gains(self.law, voice - lower as f32);
        (lower, upper, ga, gb)
    }
}

impl Unit for Selector {
    fn compute_next_block(&mut self) {
        let mut out = self.output.write();
        match &self.voice {
            Param::Scalar(voice) => {
                let (lower, upper, ga, gb) = self.pick(*voice);
                let (a, b) = (self.inputs[lower].read(), self.inputs[upper].read());
                for ((y, &a), &b) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
                    *y = a * ga + b * gb;
                }
            }
            Param::Stream(voice) => {
                let voice = voice.read();
                for (j, y) in out.iter_mut().enumerate() {
                    let (lower, upper, ga, gb) = self.pick(voice[j]);
                    *y = self.inputs[lower].read()[j] * ga + self.inputs[upper].read()[j] * gb;
                }
            }
        }
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }
}
