use tracing::{debug, warn};

use crate::{
    dsp::impulse::{self, even_order, PulseType, WinSincType},
    graph::{
        convolve::FirCore,
        node::{checked, Param, Stream, Unit},
    },
    AudioConfig, Result,
};

/*
Synthesized Impulse Filters
===========================

These units are `Convolve` with a built-in impulse generator. The impulse is
rebuilt only when one of its controls changes value; between changes the
unit is a plain FIR.

IrWinSinc:   windowed-sinc low-pass, high-pass, band-reject, band-pass
IrAverage:   Blackman-weighted moving average (computed once)
IrPulse:     pulse-train comb (four shapes), emphasises harmonics of `freq`
IrFm:        FM burst, a cheap way to get an inharmonic resonance

Controls are scalars or streams. Streams are read at their first sample
once per block, so impulse rebuilds happen at most once per block.

Order:
------
The filter has `order + 1` taps. Odd orders are bumped to the next even
value so the impulse has a centre tap and a delay of exactly order/2
samples. Cost is `order + 1` multiply-adds per sample.
*/

pub const MAX_ORDER: usize = 1 << 16;

fn impulse_size(order: usize) -> usize {
    let order = if order > MAX_ORDER {
        warn!(requested = order, max = MAX_ORDER, "impulse order clamped");
        MAX_ORDER
    } else {
        order
    };
    even_order(order) + 1
}

/// Forward mul/add setters to the shared FIR core.
macro_rules! fir_post_setters {
    ($ty:ty) => {
        impl $ty {
            pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
                self.core.post.set_mul(mul)
            }

            pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
                self.core.post.set_add(add)
            }

            /// Current impulse response.
            pub fn impulse(&self) -> &[f32] {
                &self.core.taps
            }
        }
    };
}

/// Windowed-sinc FIR with four topologies.
pub struct IrWinSinc {
    core: FirCore,
    scratch: Vec<f32>,
    sample_rate: f32,
    block_size: usize,
    freq: Param,
    bw: Param,
    kind: WinSincType,
    last_freq: f32,
    last_bw: f32,
    dirty: bool,
}

impl IrWinSinc {
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        freq: impl Into<Param>,
        bw: impl Into<Param>,
        kind: WinSincType,
        order: usize,
    ) -> Result<Self> {
        let size = impulse_size(order);
        let mut unit = Self {
            core: FirCore::new(config, input, size)?,
            scratch: vec![0.0; size],
            sample_rate: config.sample_rate,
            block_size: config.block_size,
            freq: checked(freq, config.block_size)?,
            bw: checked(bw, config.block_size)?,
            kind,
            last_freq: -1.0,
            last_bw: -1.0,
            dirty: true,
        };
        unit.refresh();
        Ok(unit)
    }

    pub fn set_freq(&mut self, freq: impl Into<Param>) -> Result<()> {
        self.freq = checked(freq, self.block_size)?;
        Ok(())
    }

    pub fn set_bw(&mut self, bw: impl Into<Param>) -> Result<()> {
        self.bw = checked(bw, self.block_size)?;
        Ok(())
    }

    pub fn set_type(&mut self, kind: WinSincType) {
        if kind != self.kind {
            self.kind = kind;
            self.dirty = true;
        }
    }

    fn refresh(&mut self) {
        let freq = self.freq.first();
        let bw = self.bw.first();
        if !self.dirty && freq == self.last_freq && bw == self.last_bw {
            return;
        }
        impulse::winsinc(
            &mut self.core.taps,
            &mut self.scratch,
            self.kind,
            freq,
            bw,
            self.sample_rate,
        );
        self.last_freq = freq;
        self.last_bw = bw;
        self.dirty = false;
        debug!(freq, bw, kind = ?self.kind, "windowed-sinc impulse rebuilt");
    }
}

fir_post_setters!(IrWinSinc);

impl Unit for IrWinSinc {
    fn compute_next_block(&mut self) {
        self.refresh();
        self.core.run();
    }

    fn output(&self) -> Stream {
        self.core.output()
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}

/// Blackman-weighted moving average.
pub struct IrAverage {
    core: FirCore,
}

impl IrAverage {
    pub fn new(config: &AudioConfig, input: &Stream, order: usize) -> Result<Self> {
        let mut core = FirCore::new(config, input, impulse_size(order))?;
        impulse::average(&mut core.taps);
        Ok(Self { core })
    }
}

fir_post_setters!(IrAverage);

impl Unit for IrAverage {
    fn compute_next_block(&mut self) {
        self.core.run();
    }

    fn output(&self) -> Stream {
        self.core.output()
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}

/// Pulse-train comb filter.
pub struct IrPulse {
    core: FirCore,
    sample_rate: f32,
    block_size: usize,
    freq: Param,
    bw: Param,
    kind: PulseType,
    last_freq: f32,
    last_bw: f32,
    dirty: bool,
}

impl IrPulse {
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        freq: impl Into<Param>,
        bw: impl Into<Param>,
        kind: PulseType,
        order: usize,
    ) -> Result<Self> {
        let mut unit = Self {
            core: FirCore::new(config, input, impulse_size(order))?,
            sample_rate: config.sample_rate,
            block_size: config.block_size,
            freq: checked(freq, config.block_size)?,
            bw: checked(bw, config.block_size)?,
            kind,
            last_freq: -1.0,
            last_bw: -1.0,
            dirty: true,
        };
        unit.refresh();
        Ok(unit)
    }

    pub fn set_freq(&mut self, freq: impl Into<Param>) -> Result<()> {
        self.freq = checked(freq, self.block_size)?;
        Ok(())
    }

    pub fn set_bw(&mut self, bw: impl Into<Param>) -> Result<()> {
        self.bw = checked(bw, self.block_size)?;
        Ok(())
    }

    pub fn set_type(&mut self, kind: PulseType) {
        if kind != self.kind {
            self.kind = kind;
            self.dirty = true;
        }
    }

    fn refresh(&mut self) {
        let freq = self.freq.first();
        let bw = self.bw.first();
        if !self.dirty && freq == self.last_freq && bw == self.last_bw {
            return;
        }
        impulse::pulse(&mut self.core.taps, self.kind, freq, bw, self.sample_rate);
        self.last_freq = freq;
        self.last_bw = bw;
        self.dirty = false;
        debug!(freq, bw, kind = ?self.kind, "pulse impulse rebuilt");
    }
}

fir_post_setters!(IrPulse);

impl Unit for IrPulse {
    fn compute_next_block(&mut self) {
        self.refresh();
        self.core.run();
    }

    fn output(&self) -> Stream {
        self.core.output()
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}

/// FM-burst filter.
pub struct IrFm {
    core: FirCore,
    sample_rate: f32,
    block_size: usize,
    carrier: Param,
    ratio: Param,
    index: Param,
    // carrier, ratio, index
    last: [f32; 3],
}

impl IrFm {
    pub fn new(
        config: &AudioConfig,
        input: &Stream,
        carrier: impl Into<Param>,
        ratio: impl Into<Param>,
        index: impl Into<Param>,
        order: usize,
    ) -> Result<Self> {
        let mut unit = Self {
            core: FirCore::new(config, input, impulse_size(order))?,
            sample_rate: config.sample_rate,
            block_size: config.block_size,
            carrier: checked(carrier, config.block_size)?,
            ratio: checked(ratio, config.block_size)?,
            index: checked(index, config.block_size)?,
            last: [-1.0; 3],
        };
        unit.refresh();
        Ok(unit)
    }

    pub fn set_carrier(&mut self, carrier: impl Into<Param>) -> Result<()> {
        self.carrier = checked(carrier, self.block_size)?;
        Ok(())
    }

    pub fn set_ratio(&mut self, ratio: impl Into<Param>) -> Result<()> {
        self.ratio = checked(ratio, self.block_size)?;
        Ok(())
    }

    pub fn set_index(&mut self, index: impl Into<Param>) -> Result<()> {
        self.index = checked(index, self.block_size)?;
        Ok(())
    }

    fn refresh(&mut self) {
        let current = [self.carrier.first(), self.ratio.first(), self.index.first()];
        if current == self.last {
            return;
        }
        let [carrier, ratio, index] = current;
        impulse::fm(&mut self.core.taps, carrier, ratio, index, self.sample_rate);
        self.last = current;
        debug!(carrier, ratio, index, "fm impulse rebuilt");
    }
}

fir_post_setters!(IrFm);

impl Unit for IrFm {
    fn compute_next_block(&mut self) {
        self.refresh();
        self.core.run();
    }

    fn output(&self) -> Stream {
        self.core.output()
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
