use crate::{
    graph::node::{checked_input, MulAdd, Param, Stream, Unit},
    AudioConfig, Result, SeedRegistry,
};

/*
Denormal Protection
===================

When a recursive filter decays toward silence its state values shrink into
the subnormal range, where many CPUs slow down dramatically. Adding a tiny
amount of noise keeps the values normal:

    out = in + uniform(-1, 1) · 1e-24

1e-24 is about -480 dB: far below anything audible, far above the subnormal
threshold of f32 (~1.2e-38). Place a Denorm in front of long-tailed
recursive units (reverbs, resonant filters) that may be fed silence.
*/

pub const DENORM_AMPLITUDE: f32 = 1e-24;

/// Seed-registry key for denormal noise.
pub const SEED_KIND: &str = "Denorm";

pub struct Denorm {
    input: Stream,
    rng: fastrand::Rng,
    output: Stream,
    post: MulAdd,
}

impl Denorm {
    pub fn new(config: &AudioConfig, input: &Stream, seeds: &mut SeedRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            input: checked_input(input, config.block_size)?,
            rng: seeds.rng(SEED_KIND),
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

impl Unit for Denorm {
    fn compute_next_block(&mut self) {
        let input = self.input.read();
        let mut out = self.output.write();
        for (y, &x) in out.iter_mut().zip(input.iter()) {
            let noise = self.rng.f32() * 2.0 - 1.0;
            *y = x + noise * DENORM_AMPLITUDE;
        }
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_becomes_tiny_noise() {
        let config = AudioConfig::default().with_block_size(256);
        let input = Stream::new(256);
        let mut seeds = SeedRegistry::default();
        let mut denorm = Denorm::new(&config, &input, &mut seeds).unwrap();
        denorm.compute_next_block();
        let out = denorm.output().to_vec();
        assert!(out.iter().all(|y| y.abs() <= DENORM_AMPLITUDE));
        assert!(out.iter().any(|&y| y != 0.0));
    }

    #[test]
    fn test_audible_signal_unchanged() {
        let config = AudioConfig::default().with_block_size(4);
        let input = Stream::from_slice(&[0.5, -0.25, 1.0, 0.125]);
        let mut seeds = SeedRegistry::default();
        let mut denorm = Denorm::new(&config, &input, &mut seeds).unwrap();
        denorm.compute_next_block();
        assert_eq!(denorm.output().to_vec(), input.to_vec());
    }

    #[test]
    fn test_same_seed_same_noise() {
        let config = AudioConfig::default().with_block_size(16);
        let input = Stream::new(16);
        let mut a = Denorm::new(&config, &input, &mut SeedRegistry::new(3)).unwrap();
        let mut b = Denorm::new(&config, &input, &mut SeedRegistry::new(3)).unwrap();
        a.compute_next_block();
        b.compute_next_block();
        assert_eq!(a.output().to_vec(), b.output().to_vec());
    }
}
