use std::fmt;

use crate::{
    dsp::ramp::{ramp_samples, Ramp},
    graph::node::{checked, MulAdd, Param, Stream, Unit},
    AudioConfig, Result,
};

/*
Control Signals (Sig, SigTo, VarPort)
=====================================

These units turn a control value into an audio-rate stream so it can feed
any parameter of another unit.

Sig:     the value, unchanged, every sample. Jumps immediately.
SigTo:   glides linearly to each new value over `time` seconds.
VarPort: like SigTo, plus a callback once the glide has finished.

    value set to 1.0 at t0, time = 0.1 s:

    Sig      ──┐━━━━━━━━━━━━━━━━━
    SigTo    ──╱━━━━━━━━━━━━━━━━━     reaches 1.0 exactly at t0 + 0.1 s
    VarPort  ──╱━━━━━━━━━━━━━━━━━     callback at t0 + 0.2 s (ramp + 0.1 s)

Retargeting in the middle of a glide starts the new glide from wherever the
value currently is, so there is never a discontinuity.

SigTo's target may itself be a stream; it is then followed sample by sample,
restarting the glide whenever the streamed value changes.

Example usage:
  let cutoff = SigTo::new(&config, 1000.0, 0.05, 1000.0)?;
  let mut filter = IrWinSinc::new(&config, &input, &cutoff.output(), 100.0, ..)?;
*/

/// Scalar or stream value as an audio-rate signal.
pub struct Sig {
    value: Param,
    block_size: usize,
    output: Stream,
    post: MulAdd,
}

impl Sig {
    pub fn new(config: &AudioConfig, value: impl Into<Param>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            value: checked(value, config.block_size)?,
            block_size: config.block_size,
            output: Stream::new(config.block_size),
            post: MulAdd::new(config.block_size),
        })
    }

    pub fn set_value(&mut self, value: impl Into<Param>) -> Result<()> {
        self.value = checked(value, self.block_size)?;
        Ok(())
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for Sig {
    fn compute_next_block(&mut self) {
        let mut out = self.output.write();
        self.value.fill(&mut out);
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }
}

/// Linear glide toward a target value.
pub struct SigTo {
    value: Param,
    time: Param,
    last_time: f32,
    sample_rate: f32,
    block_size: usize,
    ramp: Ramp,
    output: Stream,
    post: MulAdd,
}

impl SigTo {
    /// Glide from `init` toward `value`, taking `time` seconds per change.
    pub fn new(
        config: &AudioConfig,
        value: impl Into<Param>,
        time: impl Into<Param>,
        init: f32,
    ) -> Result<Self> {
        config.validate()?;
        let time = checked(time, config.block_size)?;
        let last_time = time.first();
        Ok(Self {
            value: checked(value, config.block_size)?,
            time,
            last_time,
            sample_rate: config.sample_rate,
            block_size: config.block_size,
            ramp: Ramp::new(init, ramp_samples(last_time, config.sample_rate)),
            output: Stream::new(config.block_size),
            post: MulAdd::new(config.block_size),
        })
    }

    /// Current (possibly mid-glide) value.
    pub fn value(&self) -> f32 {
        self.ramp.value()
    }

    pub fn set_value(&mut self, value: impl Into<Param>) -> Result<()> {
        self.value = checked(value, self.block_size)?;
        Ok(())
    }

    pub fn set_time(&mut self, time: impl Into<Param>) -> Result<()> {
        self.time = checked(time, self.block_size)?;
        Ok(())
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for SigTo {
    fn compute_next_block(&mut self) {
        let time = self.time.first();
        if time != self.last_time {
            self.ramp.set_duration(ramp_samples(time, self.sample_rate));
            self.last_time = time;
        }

        let mut out = self.output.write();
        match &self.value {
            Param::Scalar(target) => {
                self.ramp.retarget(*target);
                for y in out.iter_mut() {
                    *y = self.ramp.next_value();
                }
            }
            Param::Stream(targets) => {
                let targets = targets.read();
                for (y, &target) in out.iter_mut().zip(targets.iter()) {
                    self.ramp.retarget(target);
                    *y = self.ramp.next_value();
                }
            }
        }
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }

    /// Skip any glide in progress and hold at the current target.
    fn reset(&mut self) {
        let target = self.ramp.target();
        self.ramp.jump(target);
    }
}

/// Extra time after the ramp before the completion callback fires.
pub const VARPORT_GRACE: f32 = 0.1;

/// Glide with a completion callback.
pub struct VarPort {
    ramp: Ramp,
    sample_rate: f32,
    timeout: usize,
    timer: usize,
    fired: bool,
    callback: Option<Box<dyn FnMut()>>,
    output: Stream,
    post: MulAdd,
}

impl fmt::Debug for VarPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarPort")
            .field("ramp", &self.ramp)
            .field("timeout", &self.timeout)
            .field("timer", &self.timer)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

impl VarPort {
    pub fn new(config: &AudioConfig, value: f32, time: f32, init: f32) -> Result<Self> {
        config.validate()?;
        let mut port = Self {
            ramp: Ramp::new(init, ramp_samples(time, config.sample_rate)),
            sample_rate: config.sample_rate,
            timeout: ramp_samples(time + VARPORT_GRACE, config.sample_rate),
            timer: 0,
            fired: false,
            callback: None,
            output: Stream::new(config.block_size),
            post: MulAdd::new(config.block_size),
        };
        port.set_value(value);
        Ok(port)
    }

    /// Call `callback` once each glide has completed.
    pub fn set_callback(&mut self, callback: impl FnMut() + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Start a new glide. The completion timer restarts even when the target
    /// is unchanged.
    pub fn set_value(&mut self, value: f32) {
        self.ramp.retarget(value);
        self.timer = 0;
        self.fired = false;
    }

    /// Glide time for subsequent `set_value` calls.
    pub fn set_time(&mut self, time: f32) {
        self.ramp.set_duration(ramp_samples(time, self.sample_rate));
        self.timeout = ramp_samples(time + VARPORT_GRACE, self.sample_rate);
    }

    pub fn value(&self) -> f32 {
        self.ramp.value()
    }

    /// Samples between `set_value` and the callback.
    pub fn timeout(&self) -> usize {
        self.timeout
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for VarPort {
    fn compute_next_block(&mut self) {
        {
            let mut out = self.output.write();
            for y in out.iter_mut() {
                *y = self.ramp.next_value();
            }
            self.post.apply(&mut out);
        }

        let len = self.output.len();
        self.timer = (self.timer + len).min(self.timeout);
        if self.timer >= self.timeout && !self.fired {
            self.fired = true;
            if let Some(callback) = self.callback.as_mut() {
                callback();
            }
        }
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn config(block_size: usize) -> AudioConfig {
        AudioConfig::default()
            .with_sample_rate(44_100.0)
            .with_block_size(block_size)
    }

    #[test]
    fn test_sig_scalar_and_stream() {
        let mut sig = Sig::new(&config(4), 0.25).unwrap();
        sig.compute_next_block();
        assert_eq!(sig.output().to_vec(), vec![0.25; 4]);

        sig.set_value(Stream::from_slice(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        sig.set_mul(2.0).unwrap();
        sig.compute_next_block();
        assert_eq!(sig.output().to_vec(), vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_sigto_reaches_target_exactly() {
        let mut sig = SigTo::new(&config(441), 1.0, 0.1, 0.0).unwrap();
        let mut rendered = Vec::new();
        for _ in 0..12 {
            sig.compute_next_block();
            rendered.extend(sig.output().to_vec());
        }
        assert_eq!(rendered[4409], 1.0);
        assert!(rendered[..4409].iter().all(|&v| v < 1.0), "no overshoot");
        assert!(rendered[4409..].iter().all(|&v| v == 1.0), "holds at target");
    }

    #[test]
    fn test_sigto_retarget_is_continuous() {
        let mut sig = SigTo::new(&config(64), 1.0, 0.01, 0.0).unwrap();
        sig.compute_next_block();
        let before = *sig.output().read().last().unwrap();
        sig.set_value(-1.0).unwrap();
        sig.compute_next_block();
        let after = sig.output().read()[0];
        let step = (before + 1.0) / 441.0;
        assert!((before - after - step).abs() < 1e-5);
    }

    #[test]
    fn test_sigto_follows_stream_targets() {
        let targets = Stream::from_slice(&[1.0; 8]);
        let mut sig = SigTo::new(&config(8), &targets, 0.0, 0.0).unwrap();
        sig.compute_next_block();
        assert_eq!(sig.output().to_vec(), vec![1.0; 8]);
    }

    #[test]
    fn test_sigto_reset_skips_glide() {
        let mut sig = SigTo::new(&config(64), 0.5, 1.0, 0.0).unwrap();
        sig.compute_next_block();
        assert!(sig.value() < 0.5);
        sig.reset();
        assert_eq!(sig.value(), 0.5);
        sig.compute_next_block();
        assert_eq!(sig.output().to_vec(), vec![0.5; 64]);
    }

    #[test]
    fn test_sigto_time_change_mid_glide() {
        // Longer time: the running glide keeps its step and stops at the target
        let mut sig = SigTo::new(&config(441), 1.0, 0.1, 0.0).unwrap();
        for _ in 0..5 {
            sig.compute_next_block();
        }
        sig.set_time(1.0).unwrap();
        let mut rendered = Vec::new();
        for _ in 0..20 {
            sig.compute_next_block();
            rendered.extend(sig.output().to_vec());
        }
        assert!(rendered.iter().all(|&v| v <= 1.0), "no overshoot");
        assert_eq!(rendered[4409 - 5 * 441], 1.0);
        assert_eq!(*rendered.last().unwrap(), 1.0);

        // Shorter time: the glide still completes
        let mut sig = SigTo::new(&config(441), 1.0, 1.0, 0.0).unwrap();
        for _ in 0..50 {
            sig.compute_next_block();
        }
        sig.set_time(0.1).unwrap();
        for _ in 0..200 {
            sig.compute_next_block();
        }
        assert_eq!(sig.value(), 1.0);

        // The new time applies to the next change of target
        sig.set_value(0.0).unwrap();
        let mut rendered = Vec::new();
        for _ in 0..12 {
            sig.compute_next_block();
            rendered.extend(sig.output().to_vec());
        }
        assert!(rendered[4408] > 0.0);
        assert_eq!(rendered[4409], 0.0);
    }

    #[test]
    fn test_varport_callback_fires_once_after_timeout() {
        let calls = Rc::new(Cell::new(0));
        let mut port = VarPort::new(&config(441), 1.0, 0.1, 0.0).unwrap();
        let counter = Rc::clone(&calls);
        port.set_callback(move || counter.set(counter.get() + 1));
        assert_eq!(port.timeout(), 8820);

        for block in 1..=30 {
            port.compute_next_block();
            let expected = if block >= 20 { 1 } else { 0 };
            assert_eq!(calls.get(), expected, "after block {}", block);
        }
        assert_eq!(port.value(), 1.0);

        port.set_value(0.5);
        for _ in 0..20 {
            port.compute_next_block();
        }
        assert_eq!(calls.get(), 2);
    }
}
