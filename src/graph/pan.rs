use crate::{
    dsp::pan::{line_gains, pan_gains, ring_gains},
    graph::node::{checked, checked_input, Param, Stream, Unit},
    AudioConfig, Error, Result,
};

/*
Spatializers (Pan, SPan, Switch)
================================

Each unit sends one input to N output channels with a gain per channel. They
differ only in the gain law (see `dsp::pan`):

    Pan      2 channels: equal-power left/right.
             >2 channels: a raised-cosine lobe per speaker around a circle,
             width set by `spread` (0 = focused, 1 = everywhere).
    SPan     equal-power between the two nearest speakers of a ring.
    Switch   equal-power between neighbouring channels of a line,
             position given as a channel number (0 .. N-1).

    Pan, 4 speakers, pan = 0.25, spread = 0.2:

        ch0 ▁▃   ch1 █   ch2 ▁   ch3 ▃▁        (lobe aimed at speaker 1)

Position (and spread) may be streamed for per-sample motion. Outputs are read
per channel with `channel(i)`; scaling is left to downstream units (`Tap`).
*/

/// Input plus per-channel block buffers shared by the spatializers.
struct ChannelFan {
    input: Stream,
    block_size: usize,
    frame: Vec<f32>,
    position: Vec<f32>,
    spread: Vec<f32>,
    scratch: Vec<Vec<f32>>,
    outputs: Vec<Stream>,
}

impl ChannelFan {
    fn new(
        config: &AudioConfig,
        input: &Stream,
        channels: usize,
        unit: &'static str,
    ) -> Result<Self> {
        config.validate()?;
        if channels == 0 {
            return Err(Error::NoChannels(unit));
        }
        let bs = config.block_size;
        Ok(Self {
            input: checked_input(input, bs)?,
            block_size: bs,
            frame: vec![0.0; channels],
            position: vec![0.0; bs],
            spread: vec![0.0; bs],
            scratch: vec![vec![0.0; bs]; channels],
            outputs: (0..channels).map(|_| Stream::new(bs)).collect(),
        })
    }

    fn render(&mut self, position: &Param, spread: &Param, gains: impl Fn(f32, f32, &mut [f32])) {
        let input = self.input.read();
        let input = &input[..self.block_size];

        if let (Param::Scalar(p), Param::Scalar(s)) = (position, spread) {
            gains(*p, *s, &mut self.frame);
            for (out, &g) in self.outputs.iter().zip(self.frame.iter()) {
                let mut out = out.write();
                for (y, &x) in out.iter_mut().zip(input.iter()) {
                    *y = x * g;
                }
            }
            return;
        }

        position.fill(&mut self.position);
        spread.fill(&mut self.spread);
        for (j, &x) in input.iter().enumerate() {
            gains(self.position[j], self.spread[j], &mut self.frame);
            for (channel, &g) in self.scratch.iter_mut().zip(self.frame.iter()) {
                channel[j] = x * g;
            }
        }
        for (out, channel) in self.outputs.iter().zip(self.scratch.iter()) {
            out.copy_from(channel);
        }
    }
}

/// Equal-power stereo pan, or spread lobes over more channels.
pub struct Pan {
    fan: ChannelFan,
    pan: Param,
    spread: Param,
}

impl Pan {
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        channels: usize,
        pan: impl Into<Param>,
        spread: impl Into<Param>,
    ) -> Result<Self> {
        let fan = ChannelFan::new(config, input, channels, "Pan")?;
        Ok(Self {
            pan: checked(pan, fan.block_size)?,
            spread: checked(spread, fan.block_size)?,
            fan,
        })
    }

    pub fn channels(&self) -> usize {
        self.fan.outputs.len()
    }

    /// Output stream of speaker `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.channels()`.
    pub fn channel(&self, i: usize) -> Stream {
        self.fan.outputs[i].clone()
    }

    pub fn set_pan(&mut self, pan: impl Into<Param>) -> Result<()> {
        self.pan = checked(pan, self.fan.block_size)?;
        Ok(())
    }

    pub fn set_spread(&mut self, spread: impl Into<Param>) -> Result<()> {
        self.spread = checked(spread, self.fan.block_size)?;
        Ok(())
    }
}

impl Unit for Pan {
    fn compute_next_block(&mut self) {
        self.fan.render(&self.pan, &self.spread, pan_gains);
    }

    fn output(&self) -> Stream {
        self.channel(0)
    }
}

/// Equal-power pan around a ring of speakers.
pub struct SPan {
    fan: ChannelFan,
    pan: Param,
}

impl SPan {
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        channels: usize,
        pan: impl Into<Param>,
    ) -> Result<Self> {
        let fan = ChannelFan::new(config, input, channels, "SPan")?;
        Ok(Self {
            pan: checked(pan, fan.block_size)?,
            fan,
        })
    }

    pub fn channels(&self) -> usize {
        self.fan.outputs.len()
    }

    /// Output stream of speaker `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.channels()`.
    pub fn channel(&self, i: usize) -> Stream {
        self.fan.outputs[i].clone()
    }

    pub fn set_pan(&mut self, pan: impl Into<Param>) -> Result<()> {
        self.pan = checked(pan, self.fan.block_size)?;
        Ok(())
    }
}

impl Unit for SPan {
    fn compute_next_block(&mut self) {
        self.fan
            .render(&self.pan, &Param::Scalar(0.0), |p, _, g| ring_gains(p, g));
    }

    fn output(&self) -> Stream {
        self.channel(0)
    }
}

/// Route to one of N channels, crossfading between neighbours.
pub struct Switch {
    fan: ChannelFan,
    voice: Param,
}

impl Switch {
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        channels: usize,
        voice: impl Into<Param>,
    ) -> Result<Self> {
        let fan = ChannelFan::new(config, input, channels, "Switch")?;
        Ok(Self {
            voice: checked(voice, fan.block_size)?,
            fan,
        })
    }

    pub fn channels(&self) -> usize {
        self.fan.outputs.len()
    }

    /// Output stream of speaker `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.channels()`.
    pub fn channel(&self, i: usize) -> Stream {
        self.fan.outputs[i].clone()
    }

    pub fn set_voice(&mut self, voice: impl Into<Param>) -> Result<()> {
        self.voice = checked(voice, self.fan.block_size)?;
        Ok(())
    }
}

impl Unit for Switch {
    fn compute_next_block(&mut self) {
        self.fan
            .render(&self.voice, &Param::Scalar(0.0), |v, _, g| line_gains(v, g));
    }

    fn output(&self) -> Stream {
        self.channel(0)
    }
}
