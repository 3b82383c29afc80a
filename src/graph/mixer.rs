use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    dsp::ramp::{ramp_samples, Ramp},
    graph::node::{checked_input, Stream, Unit},
    AudioConfig, Error, Result,
};

/*
Mixing Matrix
=============

Mixer routes any number of inputs to M output channels through a gain
matrix. Every (input, output) pair has its own gain and its own ramp:

              out 0   out 1
    "kick"  [  1.0     0.2  ]
    "pad"   [  0.3     0.3  ]
    "vox"   [  0.0     0.8  ]

Inputs are identified by a key of any ordered type (strings, ids, enums), so
inputs can come and go without reshuffling indices. Iteration follows key
order, which keeps the summation order (and therefore the rounding)
deterministic.

Each block, every output is cleared and then accumulates

    out[c][n] += in_k[n] · gain(k, c)[n]

where the gain glides linearly over `time` seconds whenever `set_amp`
changes it. Retargeting during a glide continues from the current gain.

Example usage:
  let mut mixer = Mixer::new(&config, 2, 0.05)?;
  mixer.add_input("kick", &kick.output())?;
  mixer.set_amp(&"kick", 1, 0.2);
*/

struct MixerInput {
    stream: Stream,
    gains: Vec<Ramp>,
}

/// N inputs by M outputs with per-pair ramped gains.
pub struct Mixer<K: Ord = usize> {
    block_size: usize,
    sample_rate: f32,
    ramp_len: usize,
    inputs: BTreeMap<K, MixerInput>,
    outputs: Vec<Stream>,
}

impl<K: Ord> Mixer<K> {
    pub fn new(config: &AudioConfig, channels: usize, time: f32) -> Result<Self> {
        config.validate()?;
        if channels == 0 {
            return Err(Error::NoChannels("Mixer"));
        }
        Ok(Self {
            block_size: config.block_size,
            sample_rate: config.sample_rate,
            ramp_len: ramp_samples(time, config.sample_rate),
            inputs: BTreeMap::new(),
            outputs: (0..channels).map(|_| Stream::new(config.block_size)).collect(),
        })
    }

    pub fn channels(&self) -> usize {
        self.outputs.len()
    }

    /// Output stream of channel `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.channels()`.
    pub fn channel(&self, i: usize) -> Stream {
        self.outputs[i].clone()
    }

    pub fn inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Register (or rebind) an input. New inputs start silent on every
    /// output; rebinding keeps the current gains.
    pub fn add_input(&mut self, key: K, stream: &Stream) -> Result<()> {
        let stream = checked_input(stream, self.block_size)?;
        let channels = self.outputs.len();
        let ramp_len = self.ramp_len;
        self.inputs
            .entry(key)
            .and_modify(|input| input.stream = stream.clone())
            .or_insert_with(|| MixerInput {
                stream,
                gains: vec![Ramp::new(0.0, ramp_len); channels],
            });
        debug!(inputs = self.inputs.len(), "mixer input added");
        Ok(())
    }

    /// Returns false when `key` was not registered.
    pub fn remove_input(&mut self, key: &K) -> bool {
        self.inputs.remove(key).is_some()
    }

    /// Glide the gain from `key` to output `channel` toward `amp`.
    /// Returns false for an unknown input or channel.
    pub fn set_amp(&mut self, key: &K, channel: usize, amp: f32) -> bool {
        match self
            .inputs
            .get_mut(key)
            .and_then(|input| input.gains.get_mut(channel))
        {
            Some(gain) => {
                gain.retarget(amp);
                true
            }
            None => false,
        }
    }

    /// Current (possibly mid-ramp) gain.
    pub fn amp(&self, key: &K, channel: usize) -> Option<f32> {
        self.inputs
            .get(key)
            .and_then(|input| input.gains.get(channel))
            .map(Ramp::value)
    }

    /// Ramp time in seconds for subsequent gain changes.
    pub fn set_time(&mut self, time: f32) {
        self.ramp_len = ramp_samples(time, self.sample_rate);
        for input in self.inputs.values_mut() {
            for gain in &mut input.gains {
                gain.set_duration(self.ramp_len);
            }
        }
    }
}

impl<K: Ord> Unit for Mixer<K> {
    fn compute_next_block(&mut self) {
        for (channel, out) in self.outputs.iter().enumerate() {
            let mut out = out.write();
            out.fill(0.0);
            for input in self.inputs.values_mut() {
                let samples = input.stream.read();
                let gain = &mut input.gains[channel];
                for (y, &x) in out.iter_mut().zip(samples.iter()) {
                    *y += x * gain.next_value();
                }
            }
        }
    }

    fn output(&self) -> Stream {
        self.channel(0)
    }

    /// Finish every gain glide immediately.
    fn reset(&mut self) {
        for input in self.inputs.values_mut() {
            for gain in &mut input.gains {
                let target = gain.target();
                gain.jump(target);
            }
        }
    }
}
