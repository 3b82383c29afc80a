use tracing::debug;

use crate::{
    dsp::polyphase::Polyphase,
    graph::node::{checked_input, MulAdd, Param, Stream, Unit},
    AudioConfig, Error, Result,
};

/*
Integer-Factor Resampling
=========================

Resample changes the rate of a stream by an integer factor F. The output
block is F times longer (upsampling) or F times shorter (downsampling) than
the host block, so Resample is the bridge into and out of an oversampled
section of a patch:

    [input] → [Resample up ×4] → (nonlinear stage at 4·sr) → [Resample down ×4]

Modes trade quality for cost:

    ZeroPad            up:   x, 0, 0, 0, ...   (images left in place)
                       down: keep every F-th sample
    Hold               up:   x, x, x, x, ...   (sample and hold)
                       down: average of each group of F
    Polyphase(mult)    windowed-sinc filter of order F·mult, split into F
                       sub-filters (see `dsp::polyphase`)

Larger multipliers give a steeper anti-imaging/anti-aliasing filter at the
cost of F·mult multiply-adds per high-rate sample.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleMode {
    ZeroPad,
    Hold,
    Polyphase(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

pub struct Resample {
    input: Stream,
    direction: Direction,
    factor: usize,
    mode: ResampleMode,
    in_len: usize,
    filter: Option<Polyphase>,
    output: Stream,
    post: MulAdd,
}

impl Resample {
    /// Output block of `block_size × factor` samples.
    pub fn up(
        config: &AudioConfig,
        input: &Stream,
        factor: usize,
        mode: ResampleMode,
    ) -> Result<Self> {
        Self::new(config, input, Direction::Up, factor, mode)
    }

    /// Output block of `block_size / factor` samples. `input` holds
    /// `block_size` samples (the high-rate block).
    pub fn down(
        config: &AudioConfig,
        input: &Stream,
        factor: usize,
        mode: ResampleMode,
    ) -> Result<Self> {
        Self::new(config, input, Direction::Down, factor, mode)
    }

    fn new(
        config: &AudioConfig,
        input: &Stream,
        direction: Direction,
        factor: usize,
        mode: ResampleMode,
    ) -> Result<Self> {
        config.validate()?;
        if factor == 0 || (direction == Direction::Down && config.block_size % factor != 0) {
            return Err(Error::InvalidFactor(factor));
        }
        let in_len = config.block_size;
        let out_len = match direction {
            Direction::Up => in_len * factor,
            Direction::Down => in_len / factor,
        };
        let filter = match mode {
            ResampleMode::Polyphase(mult) => Some(Polyphase::new(factor, mult)),
            _ => None,
        };
        debug!(?direction, factor, ?mode, "resampler created");

        Ok(Self {
            input: checked_input(input, in_len)?,
            direction,
            factor,
            mode,
            in_len,
            filter,
            output: Stream::new(out_len),
            post: MulAdd::new(out_len),
        })
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    pub fn mode(&self) -> ResampleMode {
        self.mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Mul/add streams must match the output block length.
    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for Resample {
    fn compute_next_block(&mut self) {
        let input = self.input.read();
        let input = &input[..self.in_len];
        let mut out = self.output.write();
        let f = self.factor;

        match (self.direction, self.filter.as_mut()) {
            (Direction::Up, Some(filter)) => {
                for (&x, frame) in input.iter().zip(out.chunks_exact_mut(f)) {
                    filter.upsample(x, frame);
                }
            }
            (Direction::Up, None) => {
                let hold = self.mode == ResampleMode::Hold;
                for (&x, frame) in input.iter().zip(out.chunks_exact_mut(f)) {
                    frame.fill(if hold { x } else { 0.0 });
                    frame[0] = x;
                }
            }
            (Direction::Down, Some(filter)) => {
                let mut ys = out.iter_mut();
                for &x in input {
                    if let Some(y) = filter.downsample(x) {
                        if let Some(slot) = ys.next() {
                            *slot = y;
                        }
                    }
                }
            }
            (Direction::Down, None) => {
                let hold = self.mode == ResampleMode::Hold;
                for (y, group) in out.iter_mut().zip(input.chunks_exact(f)) {
                    *y = if hold {
                        group.iter().sum::<f32>() / f as f32
                    } else {
                        group[0]
                    };
                }
            }
        }
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }

    fn reset(&mut self) {
        if let Some(filter) = self.filter.as_mut() {
            filter.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AudioConfig {
        AudioConfig::default().with_block_size(8)
    }

    #[test]
    fn test_invalid_factors_rejected() {
        let input = Stream::new(8);
        assert!(matches!(
            Resample::up(&config(), &input, 0, ResampleMode::Hold),
            Err(Error::InvalidFactor(0))
        ));
        assert!(matches!(
            Resample::down(&config(), &input, 3, ResampleMode::Hold),
            Err(Error::InvalidFactor(3))
        ));
    }

    #[test]
    fn test_zero_pad_and_hold_upsampling() {
        let input = Stream::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let mut pad = Resample::up(&config(), &input, 2, ResampleMode::ZeroPad).unwrap();
        pad.compute_next_block();
        assert_eq!(pad.output().read()[..6], [1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);

        let mut hold = Resample::up(&config(), &input, 2, ResampleMode::Hold).unwrap();
        hold.compute_next_block();
        assert_eq!(hold.output().len(), 16);
        assert_eq!(hold.output().read()[..6], [1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_decimation_modes() {
        let input = Stream::from_slice(&[1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0]);
        let mut pick = Resample::down(&config(), &input, 2, ResampleMode::ZeroPad).unwrap();
        pick.compute_next_block();
        assert_eq!(pick.output().to_vec(), vec![1.0, 5.0, 9.0, 13.0]);

        let mut avg = Resample::down(&config(), &input, 2, ResampleMode::Hold).unwrap();
        avg.compute_next_block();
        assert_eq!(avg.output().to_vec(), vec![2.0, 6.0, 10.0, 14.0]);
    }

    #[test]
    fn test_polyphase_round_trip_preserves_dc() {
        let config = AudioConfig::default().with_block_size(32);
        let input = Stream::from_slice(&[1.0; 32]);
        let mut up = Resample::up(&config, &input, 4, ResampleMode::Polyphase(8)).unwrap();

        let high_rate = config.with_block_size(128);
        let mut down =
            Resample::down(&high_rate, &up.output(), 4, ResampleMode::Polyphase(8)).unwrap();

        for _ in 0..8 {
            up.compute_next_block();
            down.compute_next_block();
        }
        for &y in down.output().read().iter() {
            assert!((y - 1.0).abs() < 0.05, "round trip drifted to {}", y);
        }
    }
}
