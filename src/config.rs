//! Host-provided audio settings shared by every unit.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result, MAX_BLOCK_SIZE};

/// Sample rate, block size and hardware channel count.
///
/// Every unit captures a copy at construction time; changing the host
/// configuration means building new units.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioConfig {
    pub sample_rate: f32,
    pub block_size: usize,
    pub channels: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            block_size: 256,
            channels: 2,
        }
    }
}

impl AudioConfig {
    pub fn new(sample_rate: f32, block_size: usize) -> Result<Self> {
        let config = Self {
            sample_rate,
            block_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidBlockSize(self.block_size));
        }
        if self.channels == 0 {
            return Err(Error::NoChannels("AudioConfig"));
        }
        Ok(())
    }

    /// Nyquist frequency in Hz.
    #[inline]
    pub fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }

    /// Convert a duration in seconds into a whole number of samples.
    #[inline]
    pub fn seconds_to_samples(&self, seconds: f32) -> usize {
        (seconds.max(0.0) * self.sample_rate) as usize
    }
}
