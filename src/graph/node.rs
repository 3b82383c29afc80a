use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::{Error, Result};

/*
Streams, Parameters and Units
=============================

Every unit writes its result into one or more `Stream`s: shared handles to a
block-sized buffer. Downstream units clone the handle and read the buffer
after the producer has run.

    [Sig] ──stream──→ [BandSplitter] ──band(0)──→ [Tap]
                                     ──band(1)──→ [Pan] ──channel(0)──→ ...

The driver calls `compute_next_block()` on every unit once per cycle, in
producer-before-consumer order. Nothing is scheduled implicitly; the order
of calls *is* the topology.

Parameters:
-----------

Each named parameter of a unit is a `Param`: either a plain scalar (control
rate, fixed for the whole block) or a stream (audio rate, one value per
sample). Units match on the tag once per block and run a specialised loop
for each combination, so switching a parameter between the two never leaves
stale state behind.

    unit.set_q(5.0)?;               // scalar
    unit.set_q(&lfo.output())?;     // per-sample modulation

Post-processing:
----------------

Single-output units finish each block with `out = out * mul + add`, where
`mul` and `add` are themselves `Param`s. `MulAdd` picks one of four loops
(scalar/scalar, stream/scalar, scalar/stream, stream/stream) from the tags.
*/

/// Shared handle to a block of samples.
#[derive(Debug, Clone)]
pub struct Stream(Rc<RefCell<Vec<f32>>>);

impl Stream {
    /// Zero-filled stream of `len` samples.
    pub fn new(len: usize) -> Self {
        Self(Rc::new(RefCell::new(vec![0.0; len])))
    }

    pub fn from_slice(samples: &[f32]) -> Self {
        Self(Rc::new(RefCell::new(samples.to_vec())))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn read(&self) -> Ref<'_, [f32]> {
        Ref::map(self.0.borrow(), |v| v.as_slice())
    }

    pub fn write(&self) -> RefMut<'_, [f32]> {
        RefMut::map(self.0.borrow_mut(), |v| v.as_mut_slice())
    }

    /// Overwrite the block from `src`; extra samples on either side are left alone.
    pub fn copy_from(&self, src: &[f32]) {
        let mut buf = self.0.borrow_mut();
        let n = buf.len().min(src.len());
        buf[..n].copy_from_slice(&src[..n]);
    }

    pub fn fill(&self, value: f32) {
        self.0.borrow_mut().fill(value);
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.0.borrow().clone()
    }

    /// Whether both handles point at the same buffer.
    pub fn ptr_eq(&self, other: &Stream) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A parameter value: one scalar per block, or one value per sample.
#[derive(Debug, Clone)]
pub enum Param {
    Scalar(f32),
    Stream(Stream),
}

impl Default for Param {
    fn default() -> Self {
        Param::Scalar(0.0)
    }
}

impl From<f32> for Param {
    fn from(value: f32) -> Self {
        Param::Scalar(value)
    }
}

impl From<Stream> for Param {
    fn from(stream: Stream) -> Self {
        Param::Stream(stream)
    }
}

impl From<&Stream> for Param {
    fn from(stream: &Stream) -> Self {
        Param::Stream(stream.clone())
    }
}

impl Param {
    pub fn is_stream(&self) -> bool {
        matches!(self, Param::Stream(_))
    }

    /// Scalar value, or the first sample of the stream.
    ///
    /// Control-rate consumers (crossover boundaries, reverb coefficients in
    /// scalar mode) sample streams here once per block.
    pub fn first(&self) -> f32 {
        match self {
            Param::Scalar(v) => *v,
            Param::Stream(s) => s.read().first().copied().unwrap_or(0.0),
        }
    }

    /// Write the per-sample values into `out`.
    pub fn fill(&self, out: &mut [f32]) {
        match self {
            Param::Scalar(v) => out.fill(*v),
            Param::Stream(s) => {
                let src = s.read();
                let n = out.len().min(src.len());
                out[..n].copy_from_slice(&src[..n]);
            }
        }
    }

    /// Reject streams shorter than the block they will be read over.
    pub fn check(&self, block_size: usize) -> Result<()> {
        match self {
            Param::Stream(s) if s.len() < block_size => Err(Error::StreamLength {
                expected: block_size,
                got: s.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Validate and convert a parameter in one step.
pub(crate) fn checked(value: impl Into<Param>, block_size: usize) -> Result<Param> {
    let param = value.into();
    param.check(block_size)?;
    Ok(param)
}

/// Validate an input stream against the block size.
pub(crate) fn checked_input(stream: &Stream, block_size: usize) -> Result<Stream> {
    if stream.len() < block_size {
        return Err(Error::StreamLength {
            expected: block_size,
            got: stream.len(),
        });
    }
    Ok(stream.clone())
}

/// Core trait for block-processing units.
///
/// The driver calls `compute_next_block` once per cycle; calling it twice
/// advances internal state twice.
pub trait Unit {
    fn compute_next_block(&mut self);

    /// Primary output. Multi-output units return their first band or channel.
    fn output(&self) -> Stream;

    /// Clear delay lines and filter memories.
    ///
    /// Default implementation does nothing (stateless units).
    fn reset(&mut self) {
        // Default: do nothing
    }
}

/// Allow boxed units to be used as units (for dynamic dispatch)
impl Unit for Box<dyn Unit> {
    fn compute_next_block(&mut self) {
        (**self).compute_next_block()
    }

    fn output(&self) -> Stream {
        (**self).output()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// `out = out * mul + add`, dispatched on the parameter tags.
#[derive(Debug, Clone)]
pub struct MulAdd {
    mul: Param,
    add: Param,
    block_size: usize,
}

impl MulAdd {
    pub fn new(block_size: usize) -> Self {
        Self {
            mul: Param::Scalar(1.0),
            add: Param::Scalar(0.0),
            block_size,
        }
    }

    pub fn mul(&self) -> &Param {
        &self.mul
    }

    pub fn add(&self) -> &Param {
        &self.add
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.mul = checked(mul, self.block_size)?;
        Ok(())
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.add = checked(add, self.block_size)?;
        Ok(())
    }

    pub fn apply(&self, out: &mut [f32]) {
        match (&self.mul, &self.add) {
            (Param::Scalar(m), Param::Scalar(a)) => {
                if *m == 1.0 && *a == 0.0 {
                    return;
                }
                for x in out.iter_mut() {
                    *x = *x * m + a;
                }
            }
            (Param::Stream(m), Param::Scalar(a)) => {
                let m = m.read();
                for (x, &m) in out.iter_mut().zip(m.iter()) {
                    *x = *x * m + a;
                }
            }
            (Param::Scalar(m), Param::Stream(a)) => {
                let a = a.read();
                for (x, &a) in out.iter_mut().zip(a.iter()) {
                    *x = *x * m + a;
                }
            }
            (Param::Stream(m), Param::Stream(a)) => {
                let (m, a) = (m.read(), a.read());
                for ((x, &m), &a) in out.iter_mut().zip(m.iter()).zip(a.iter()) {
                    *x = *x * m + a;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_handles_share_buffer() {
        let a = Stream::new(4);
        let b = a.clone();
        a.copy_from(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(b.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Stream::new(4)));
    }

    #[test]
    fn test_param_first_and_fill() {
        let scalar = Param::from(0.25);
        let stream = Param::from(Stream::from_slice(&[3.0, 4.0]));
        assert_eq!(scalar.first(), 0.25);
        assert_eq!(stream.first(), 3.0);

        let mut out = [0.0; 2];
        scalar.fill(&mut out);
        assert_eq!(out, [0.25, 0.25]);
        stream.fill(&mut out);
        assert_eq!(out, [3.0, 4.0]);
    }

    #[test]
    fn test_short_stream_rejected() {
        let err = checked(Stream::new(8), 16).unwrap_err();
        assert_eq!(
            err,
            Error::StreamLength {
                expected: 16,
                got: 8
            }
        );
        assert!(checked(0.5, 16).is_ok());
    }

    #[test]
    fn test_muladd_variants() {
        let mut block = [1.0, 2.0];

        let mut post = MulAdd::new(2);
        post.apply(&mut block);
        assert_eq!(block, [1.0, 2.0], "identity mul/add should be a no-op");

        post.set_mul(2.0).unwrap();
        post.set_add(0.5).unwrap();
        post.apply(&mut block);
        assert_eq!(block, [2.5, 4.5]);

        post.set_mul(&Stream::from_slice(&[0.0, 1.0])).unwrap();
        post.apply(&mut block);
        assert_eq!(block, [0.5, 5.0]);

        post.set_add(&Stream::from_slice(&[1.0, -1.0])).unwrap();
        post.apply(&mut block);
        assert_eq!(block, [1.0, 4.0]);

        post.set_mul(1.0).unwrap();
        post.apply(&mut block);
        assert_eq!(block, [2.0, 3.0]);
    }
}
