use tracing::debug;

use crate::{
    dsp::mix::dry_wet_gains,
    dsp::reverb::{damp_coef, room_feedback, FreeverbCore, FIXED_GAIN, JITTER_MIN, JITTER_SPAN},
    graph::node::{checked, checked_input, MulAdd, Param, Stream, Unit},
    AudioConfig, Result, SeedRegistry,
};

/*
Freeverb
========

Simulates the acoustic reflections of a physical space. Reverb adds depth,
dimension, and "glue" to sounds, making them feel like they exist in a room.

Signal flow:

    input ──┬──→ 8 parallel damped combs ──→ 4 series all-passes ──→ wet
            │                                                        │
            └──────────────────── dry ───────────────────────────────┴──→ out

    out = wet · 0.015 · sqrt(mix) + dry · sqrt(1 - mix)

Parameters
----------

Size (0.0 - 1.0):
  Comb feedback, 0.7 + 0.28 × size. 0.0 = small room, 1.0 = large hall

Damp (0.0 - 1.0):
  High-frequency absorption inside the combs.
  0.0 = bright, metallic    1.0 = dark, muffled

Mix (0.0 - 1.0):
  Equal-power dry/wet blend. 0.0 = all dry, 1.0 = all wet

Each parameter is a scalar or a stream, so there are eight processing
combinations. A stream holding a constant produces exactly the same samples
as the equivalent scalar.

Every instance draws one jitter value from the seed registry and adds it to
all delay lengths. Two reverbs in the same patch therefore never share comb
tunings.

Example usage:
  let mut seeds = SeedRegistry::default();
  let hall = Freeverb::new(&config, &input, 0.8, 0.5, 0.4, &mut seeds)?;
*/

/// Seed-registry key for reverb jitter.
pub const SEED_KIND: &str = "Freeverb";

/// Freeverb reverberator.
pub struct Freeverb {
    input: Stream,
    block_size: usize,
    size: Param,
    damp: Param,
    mix: Param,
    core: FreeverbCore,
    wet: Vec<f32>,
    output: Stream,
    post: MulAdd,
}

impl Freeverb {
    /// - `size`: 0.0 (small room) to 1.0 (large hall)
    /// - `damp`: 0.0 (bright) to 1.0 (dark/muffled)
    /// - `mix`: 0.0 (dry) to 1.0 (wet)
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        size: impl Into<Param>,
        damp: impl Into<Param>,
        mix: impl Into<Param>,
        seeds: &mut SeedRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let input = checked_input(input, config.block_size)?;
        let jitter = JITTER_MIN + seeds.rng(SEED_KIND).f32() * JITTER_SPAN;
        let core = FreeverbCore::new(config.sample_rate, jitter);
        debug!(jitter, combs = ?core.comb_lengths(), "freeverb created");

        Ok(Self {
            input,
            block_size: config.block_size,
            size: checked(size, config.block_size)?,
            damp: checked(damp, config.block_size)?,
            mix: checked(mix, config.block_size)?,
            core,
            wet: vec![0.0; config.block_size],
            output: Stream::new(config.block_size),
            post: MulAdd::new(config.block_size),
        })
    }

    /// Jitter added to every delay length, in reference-rate samples.
    pub fn jitter(&self) -> f32 {
        self.core.jitter()
    }

    pub fn comb_lengths(&self) -> [usize; 8] {
        self.core.comb_lengths()
    }

    pub fn set_size(&mut self, size: impl Into<Param>) -> Result<()> {
        self.size = checked(size, self.block_size)?;
        Ok(())
    }

    pub fn set_damp(&mut self, damp: impl Into<Param>) -> Result<()> {
        self.damp = checked(damp, self.block_size)?;
        Ok(())
    }

    pub fn set_mix(&mut self, mix: impl Into<Param>) -> Result<()> {
        self.mix = checked(mix, self.block_size)?;
        Ok(())
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for Freeverb {
    fn compute_next_block(&mut self) {
        let input = self.input.read();
        let input = &input[..self.block_size];
        let wet = &mut self.wet;

        match (&self.size, &self.damp) {
            (Param::Scalar(size), Param::Scalar(damp)) => {
                let (fb, dc) = (room_feedback(*size), damp_coef(*damp));
                self.core.process_block(input, wet, |_| fb, |_| dc);
            }
            (Param::Stream(size), Param::Scalar(damp)) => {
                let size = size.read();
                let dc = damp_coef(*damp);
                self.core
                    .process_block(input, wet, |j| room_feedback(size[j]), |_| dc);
            }
            (Param::Scalar(size), Param::Stream(damp)) => {
                let damp = damp.read();
                let fb = room_feedback(*size);
                self.core
                    .process_block(input, wet, |_| fb, |j| damp_coef(damp[j]));
            }
            (Param::Stream(size), Param::Stream(damp)) => {
                let (size, damp) = (size.read(), damp.read());
                self.core.process_block(
                    input,
                    wet,
                    |j| room_feedback(size[j]),
                    |j| damp_coef(damp[j]),
                );
            }
        }

        let mut out = self.output.write();
        match &self.mix {
            Param::Scalar(mix) => {
                let (wet_gain, dry_gain) = dry_wet_gains(*mix);
                for ((y, &w), &x) in out.iter_mut().zip(wet.iter()).zip(input.iter()) {
                    *y = w * FIXED_GAIN * wet_gain + x * dry_gain;
                }
            }
            Param::Stream(mix) => {
                let mix = mix.read();
                for (((y, &w), &x), &m) in out
                    .iter_mut()
                    .zip(wet.iter())
                    .zip(input.iter())
                    .zip(mix.iter())
                {
                    let (wet_gain, dry_gain) = dry_wet_gains(m);
                    *y = w * FIXED_GAIN * wet_gain + x * dry_gain;
                }
            }
        }
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }

    /// Clear the tail. Delay lengths and jitter are kept.
    fn reset(&mut self) {
        self.core.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: usize = 64;

    fn config() -> AudioConfig {
        AudioConfig::default().with_block_size(BLOCK)
    }

    fn impulse_input() -> Stream {
        let mut samples = vec![0.0; BLOCK];
        samples[0] = 1.0;
        Stream::from_slice(&samples)
    }

    fn render(reverb: &mut Freeverb, input: &Stream, first: &[f32], blocks: usize) -> Vec<f32> {
        let mut rendered = Vec::new();
        for block in 0..blocks {
            if block == 0 {
                input.copy_from(first);
            } else {
                input.fill(0.0);
            }
            reverb.compute_next_block();
            rendered.extend(reverb.output().to_vec());
        }
        rendered
    }

    #[test]
    fn test_reverb_adds_tail() {
        let input = impulse_input();
        let first = input.to_vec();
        let mut seeds = SeedRegistry::default();
        let mut reverb = Freeverb::new(&config(), &input, 0.5, 0.5, 1.0, &mut seeds).unwrap();

        let out = render(&mut reverb, &input, &first, 100);
        let tail_energy: f32 = out[BLOCK * 20..].iter().map(|x| x * x).sum();
        assert!(tail_energy > 1e-6, "Reverb should produce a tail");
    }

    #[test]
    fn test_dry_reverb_preserves_signal() {
        let input = Stream::from_slice(&[0.5; BLOCK]);
        let mut seeds = SeedRegistry::default();
        let mut reverb = Freeverb::new(&config(), &input, 0.5, 0.5, 0.0, &mut seeds).unwrap();
        reverb.compute_next_block();
        assert!(reverb.output().read().iter().all(|&y| y == 0.5));
    }

    #[test]
    fn test_jitter_drawn_once_per_instance() {
        let input = Stream::new(BLOCK);
        let mut seeds = SeedRegistry::default();
        let a = Freeverb::new(&config(), &input, 0.5, 0.5, 0.5, &mut seeds).unwrap();
        let b = Freeverb::new(&config(), &input, 0.5, 0.5, 0.5, &mut seeds).unwrap();
        assert!((10.0..30.0).contains(&a.jitter()));
        assert_ne!(a.jitter(), b.jitter());

        // Same registry seed replays the same jitter.
        let mut replay = SeedRegistry::default();
        let c = Freeverb::new(&config(), &input, 0.5, 0.5, 0.5, &mut replay).unwrap();
        assert_eq!(a.jitter(), c.jitter());
        assert_eq!(a.comb_lengths(), c.comb_lengths());
    }

    #[test]
    fn test_constant_streams_match_scalars() {
        let input = impulse_input();
        let first = input.to_vec();
        let size = Stream::from_slice(&[0.8; BLOCK]);
        let damp = Stream::from_slice(&[0.3; BLOCK]);
        let mix = Stream::from_slice(&[0.6; BLOCK]);

        let mut seeds = SeedRegistry::new(7);
        let mut scalar = Freeverb::new(&config(), &input, 0.8, 0.3, 0.6, &mut seeds).unwrap();
        let reference = render(&mut scalar, &input, &first, 40);

        let (s, d, m) = (
            || Param::Stream(size.clone()),
            || Param::Stream(damp.clone()),
            || Param::Stream(mix.clone()),
        );
        let combos: [(Param, Param, Param); 7] = [
            (s(), Param::Scalar(0.3), Param::Scalar(0.6)),
            (Param::Scalar(0.8), d(), Param::Scalar(0.6)),
            (Param::Scalar(0.8), Param::Scalar(0.3), m()),
            (s(), d(), Param::Scalar(0.6)),
            (s(), Param::Scalar(0.3), m()),
            (Param::Scalar(0.8), d(), m()),
            (s(), d(), m()),
        ];
        for (s, d, m) in combos {
            // Same base seed so the jitter matches the scalar instance.
            let mut seeds = SeedRegistry::new(7);
            let mut streamed = Freeverb::new(&config(), &input, s, d, m, &mut seeds).unwrap();
            assert_eq!(render(&mut streamed, &input, &first, 40), reference);
        }
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let input = impulse_input();
        let first = input.to_vec();

        let mut seeds = SeedRegistry::new(99);
        let mut used = Freeverb::new(&config(), &input, 0.7, 0.2, 0.5, &mut seeds).unwrap();
        render(&mut used, &input, &first, 30);
        used.reset();
        let after_reset = render(&mut used, &input, &first, 30);

        let mut seeds = SeedRegistry::new(99);
        let mut fresh = Freeverb::new(&config(), &input, 0.7, 0.2, 0.5, &mut seeds).unwrap();
        assert_eq!(after_reset, render(&mut fresh, &input, &first, 30));
    }
}
