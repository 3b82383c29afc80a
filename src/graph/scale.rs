use crate::{
    graph::node::{checked, checked_input, MulAdd, Param, Stream, Unit},
    AudioConfig, Result,
};

/*
Range Mapping (Scale)
=====================

Maps the input from one range onto another, with an optional power curve:

    norm = clip((x - inmin) / (inmax - inmin), 0, 1)
    out  = outmin + norm^exp · (outmax - outmin)

Either range may be given backwards (min > max) to flip the mapping:

    inmin=0, inmax=1, outmin=10, outmax=20:   0.5 → 15
    inmin=1, inmax=0, outmin=10, outmax=20:   0.5 → 15   (0.25 → 17.5)

exp = 1 is linear, exp > 1 bends toward the bottom of the output range
(useful for frequency or amplitude controls), 0 < exp < 1 toward the top.
Negative exponents clamp to 0.

A zero-width input range has no meaningful mapping; the output holds at
`outmin` instead of producing NaN.
*/

const INMIN: usize = 0;
const INMAX: usize = 1;
const OUTMIN: usize = 2;
const OUTMAX: usize = 3;
const EXP: usize = 4;

/// Map `x` from [inmin, inmax] to [outmin, outmax] with a power curve.
#[inline]
pub fn scale_value(x: f32, inmin: f32, inmax: f32, outmin: f32, outmax: f32, exp: f32) -> f32 {
    let (lo, hi, in_rev) = if inmin <= inmax {
        (inmin, inmax, false)
    } else {
        (inmax, inmin, true)
    };
    let in_range = hi - lo;
    if in_range == 0.0 {
        return outmin;
    }

    let mut norm = ((x - lo) / in_range).clamp(0.0, 1.0);
    if in_rev {
        norm = 1.0 - norm;
    }
    let exp = exp.max(0.0);
    if exp != 1.0 {
        norm = norm.powf(exp);
    }

    if outmin <= outmax {
        norm * (outmax - outmin) + outmin
    } else {
        outmin - norm * (outmin - outmax)
    }
}

pub struct Scale {
    input: Stream,
    block_size: usize,
    // inmin, inmax, outmin, outmax, exp
    params: [Param; 5],
    scratch: [Vec<f32>; 5],
    output: Stream,
    post: MulAdd,
}

impl Scale {
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        inmin: impl Into<Param>,
        inmax: impl Into<Param>,
        outmin: impl Into<Param>,
        outmax: impl Into<Param>,
        exp: impl Into<Param>,
    ) -> Result<Self> {
        config.validate()?;
        let bs = config.block_size;
        Ok(Self {
            input: checked_input(input, bs)?,
            block_size: bs,
            params: [
                checked(inmin, bs)?,
                checked(inmax, bs)?,
                checked(outmin, bs)?,
                checked(outmax, bs)?,
                checked(exp, bs)?,
            ],
            scratch: std::array::from_fn(|_| vec![0.0; bs]),
            output: Stream::new(bs),
            post: MulAdd::new(bs),
        })
    }

    fn set(&mut self, slot: usize, value: impl Into<Param>) -> Result<()> {
        self.params[slot] = checked(value, self.block_size)?;
        Ok(())
    }

    pub fn set_inmin(&mut self, value: impl Into<Param>) -> Result<()> {
        self.set(INMIN, value)
    }

    pub fn set_inmax(&mut self, value: impl Into<Param>) -> Result<()> {
        self.set(INMAX, value)
    }

    pub fn set_outmin(&mut self, value: impl Into<Param>) -> Result<()> {
        self.set(OUTMIN, value)
    }

    pub fn set_outmax(&mut self, value: impl Into<Param>) -> Result<()> {
        self.set(OUTMAX, value)
    }

    pub fn set_exp(&mut self, value: impl Into<Param>) -> Result<()> {
        self.set(EXP, value)
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for Scale {
    fn compute_next_block(&mut self) {
        let input = self.input.read();
        let mut out = self.output.write();

        if self.params.iter().all(|p| !p.is_stream()) {
            let [inmin, inmax, outmin, outmax, exp] = self.params.each_ref().map(Param::first);
            for (y, &x) in out.iter_mut().zip(input.iter()) {
                *y = scale_value(x, inmin, inmax, outmin, outmax, exp);
            }
        } else {
            for (param, buf) in self.params.iter().zip(self.scratch.iter_mut()) {
                param.fill(buf);
            }
            let [inmin, inmax, outmin, outmax, exp] = &self.scratch;
            for (j, (y, &x)) in out.iter_mut().zip(input.iter()).enumerate() {
                *y = scale_value(x, inmin[j], inmax[j], outmin[j], outmax[j], exp[j]);
            }
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
    fn test_forward_and_reversed_input_ranges() {
        assert_eq!(scale_value(0.5, 0.0, 1.0, 10.0, 20.0, 1.0), 15.0);
        assert_eq!(scale_value(0.5, 1.0, 0.0, 10.0, 20.0, 1.0), 15.0);
        assert_eq!(scale_value(0.25, 1.0, 0.0, 10.0, 20.0, 1.0), 17.5);
    }

    #[test]
    fn test_reversed_output_range() {
        assert_eq!(scale_value(0.25, 0.0, 1.0, 20.0, 10.0, 1.0), 17.5);
    }

    #[test]
    fn test_input_is_clipped() {
        assert_eq!(scale_value(-3.0, 0.0, 1.0, 10.0, 20.0, 1.0), 10.0);
        assert_eq!(scale_value(9.0, 0.0, 1.0, 10.0, 20.0, 1.0), 20.0);
    }

    #[test]
    fn test_exponent_curve_and_clamp() {
        assert_eq!(scale_value(0.5, 0.0, 1.0, 0.0, 1.0, 2.0), 0.25);
        // Negative exponent clamps to 0: every input maps to the top.
        assert_eq!(scale_value(0.3, 0.0, 1.0, 0.0, 1.0, -1.0), 1.0);
    }

    #[test]
    fn test_zero_width_range_holds_outmin() {
        assert_eq!(scale_value(0.7, 2.0, 2.0, 5.0, 9.0, 1.0), 5.0);
    }

    #[test]
    fn test_unit_with_streamed_outmax() {
        let config = AudioConfig::default().with_block_size(4);
        let input = Stream::from_slice(&[0.5; 4]);
        let outmax = Stream::from_slice(&[20.0, 30.0, 40.0, 50.0]);
        let mut scale = Scale::new(&config, &input, 0.0, 1.0, 10.0, &outmax, 1.0).unwrap();
        scale.compute_next_block();
        assert_eq!(scale.output().to_vec(), vec![15.0, 20.0, 25.0, 30.0]);

        scale.set_outmax(20.0).unwrap();
        scale.set_inmin(1.0).unwrap();
        scale.set_inmax(0.0).unwrap();
        scale.compute_next_block();
        assert_eq!(scale.output().to_vec(), vec![15.0; 4]);
    }
}
