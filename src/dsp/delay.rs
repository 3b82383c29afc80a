//! Fixed-length ring buffer shared by the convolution and reverb units.

/*
Ring Buffers
============

A delay line is an array plus a cursor that walks forward and wraps:

    index:   0   1   2   3   4   5
           ┌───┬───┬───┬───┬───┬───┐
           │ e │ f │ a │ b │ c │ d │      cursor = 2
           └───┴───┴───┴───┴───┴───┘
                     ▲
              oldest sample, about to be overwritten

Reading at the cursor gives the sample written `len` steps ago, which is all
a comb or all-pass stage needs. Direct convolution instead writes the new
sample at the cursor and walks backwards through the whole ring:

    y[n] = Σ_{k=0}^{N-1} ring[(cursor - k) mod N] · h[k]

The cursor is always kept in [0, len).
*/

#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    cursor: usize,
}

impl DelayLine {
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sample at the cursor (written `len` steps ago).
    #[inline]
    pub fn tap(&self) -> f32 {
        self.buffer[self.cursor]
    }

    /// Overwrite the sample at the cursor, then advance.
    #[inline]
    pub fn write_advance(&mut self, value: f32) {
        self.buffer[self.cursor] = value;
        self.cursor += 1;
        if self.cursor == self.buffer.len() {
            self.cursor = 0;
        }
    }

    /// Push `input` and return its convolution with `impulse`.
    ///
    /// `impulse` must be exactly as long as the ring.
    #[inline]
    pub fn convolve(&mut self, input: f32, impulse: &[f32]) -> f32 {
        debug_assert_eq!(impulse.len(), self.buffer.len());
        self.write_advance(input);
        self.dot_recent(impulse)
    }

    /// Dot product of `impulse` with the ring, newest sample first.
    ///
    /// `impulse` may be shorter than the ring; the oldest samples are then
    /// ignored.
    #[inline]
    pub fn dot_recent(&self, impulse: &[f32]) -> f32 {
        let len = self.buffer.len();
        let newest = (self.cursor + len - 1) % len;

        // older = [0..=newest], newest first once reversed; newer wraps around.
        let (older, newer) = self.buffer.split_at(newest + 1);
        older
            .iter()
            .rev()
            .chain(newer.iter().rev())
            .zip(impulse.iter())
            .fold(0.0, |acc, (&x, &h)| acc + x * h)
    }

    /// Resize the ring, clearing its contents.
    pub fn resize(&mut self, len: usize) {
        self.buffer.clear();
        self.buffer.resize(len.max(1), 0.0);
        self.cursor = 0;
    }

    /// Zero the contents in place, keeping the allocation.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = 0;
    }
}
