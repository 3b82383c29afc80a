//! Linear parameter ramps.

/*
Linear Ramps
============

A ramp glides from its current value to a target over a fixed number of
samples instead of jumping, which is what keeps a changing gain or a moving
control from clicking.

    value
      1.0 ┤              ●━━━━━━━━━   ← holds at target
          │           ╱
          │        ╱
          │     ╱
      0.0 ┼━━●                          ← target changes here
          └──────────────────────────▶ samples
             |← duration →|

When the target changes:

    elapsed = 0
    step    = (target - current) / duration

Each sample, while elapsed < duration:

    elapsed += 1
    current  = target             if elapsed == duration
             = current + step     otherwise

The last step snaps exactly to the target, so accumulated rounding error in
`current += step` never leaves the value a hair off (or past) the target.

Retargeting mid-ramp recomputes the step from `current`, wherever the ramp
happens to be. The trajectory bends but never jumps.

A new duration is held until the next retarget. Changing it under a running
glide would leave `step` sized for the old length and walk past the target.
*/

/// Ramp length in samples for a time in seconds.
#[inline]
pub fn ramp_samples(seconds: f32, sample_rate: f32) -> usize {
    (seconds.max(0.0) * sample_rate).round() as usize
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    current: f32,
    target: f32,
    step: f32,
    elapsed: usize,
    duration: usize,
    next_duration: usize,
}

impl Ramp {
    /// A ramp resting at `value`.
    pub fn new(value: f32, duration: usize) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
            elapsed: duration,
            duration,
            next_duration: duration,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn elapsed(&self) -> usize {
        self.elapsed
    }

    /// Length of the glide in progress (or of the last one).
    #[inline]
    pub fn duration(&self) -> usize {
        self.duration
    }

    /// True once the ramp holds at its target.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Change the ramp length used by the next retarget. A glide already
    /// in progress keeps its length and step.
    pub fn set_duration(&mut self, duration: usize) {
        self.next_duration = duration;
    }

    /// Start a new ramp toward `target` if it differs from the last one.
    /// Returns true when a new ramp started.
    #[inline]
    pub fn retarget(&mut self, target: f32) -> bool {
        if target == self.target {
            return false;
        }
        self.target = target;
        self.elapsed = 0;
        self.duration = self.next_duration;
        if self.duration == 0 {
            self.current = target;
            self.step = 0.0;
        } else {
            self.step = (target - self.current) / self.duration as f32;
        }
        true
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.elapsed < self.duration {
            self.elapsed += 1;
            if self.elapsed == self.duration {
                self.current = self.target;
            } else {
                self.current += self.step;
            }
        }
        self.current
    }

    /// Jump straight to `value` with no ramp.
    pub fn jump(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.elapsed = self.duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaches_target_exactly_after_duration() {
        let mut ramp = Ramp::new(0.0, 4410);
        ramp.retarget(1.0);
        let mut last = 0.0;
        for n in 1..=4410 {
            last = ramp.next_value();
            if n < 4410 {
                assert!(last < 1.0, "overshoot at sample {}", n);
            }
        }
        assert_eq!(last, 1.0);
        for _ in 0..100 {
            assert_eq!(ramp.next_value(), 1.0);
        }
        assert!(ramp.is_done());
    }

    #[test]
    fn test_retarget_from_current_value() {
        let mut ramp = Ramp::new(0.0, 100);
        ramp.retarget(1.0);
        for _ in 0..50 {
            ramp.next_value();
        }
        let mid = ramp.value();
        ramp.retarget(0.0);
        let next = ramp.next_value();
        // One step of (0 - mid) / 100 away from mid: no jump.
        assert!((next - mid).abs() <= mid / 100.0 + 1e-6);
        assert!(next < mid);
    }

    #[test]
    fn test_same_target_does_not_restart() {
        let mut ramp = Ramp::new(0.0, 10);
        assert!(ramp.retarget(1.0));
        ramp.next_value();
        assert!(!ramp.retarget(1.0));
        assert_eq!(ramp.elapsed(), 1);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut ramp = Ramp::new(0.0, 0);
        ramp.retarget(0.5);
        assert_eq!(ramp.value(), 0.5);
        assert_eq!(ramp.next_value(), 0.5);
    }

    #[test]
    fn test_longer_duration_waits_for_next_retarget() {
        let mut ramp = Ramp::new(0.0, 100);
        ramp.retarget(1.0);
        for _ in 0..50 {
            ramp.next_value();
        }
        ramp.set_duration(1000);
        let mut peak: f32 = 0.0;
        for _ in 0..2000 {
            peak = peak.max(ramp.next_value());
        }
        assert_eq!(peak, 1.0);
        assert_eq!(ramp.value(), 1.0);

        ramp.retarget(0.0);
        assert_eq!(ramp.duration(), 1000);
    }

    #[test]
    fn test_shorter_duration_still_reaches_target() {
        let mut ramp = Ramp::new(0.0, 1000);
        ramp.retarget(1.0);
        for _ in 0..500 {
            ramp.next_value();
        }
        ramp.set_duration(10);
        for _ in 0..500 {
            ramp.next_value();
        }
        assert_eq!(ramp.value(), 1.0);
        assert!(ramp.is_done());
    }
}
