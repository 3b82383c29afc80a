use crate::{
    dsp::pitch,
    graph::node::{checked_input, MulAdd, Param, Stream, Unit},
    AudioConfig, Result,
};

/*
Unit Conversions
================

Converter applies one pitch or gain conversion to every sample of its input:

    DbToAmp          -6 dB      →  0.501
    AmpToDb           0.5       →  -6.02 dB
    MidiToFreq        69        →  440 Hz
    FreqToMidi        261.63 Hz →  60
    MidiToTranspo     72 (centre 60)  →  2.0
    CentsToTranspo    1200      →  2.0
    TranspoToCents    0.5       →  -1200

Both decibel conversions floor at -120 dB (amplitude 1e-6): quieter
amplitudes report -120 dB and -120 dB or below converts to silence.

Control signals often hold the same value for long stretches, so the last
input and its result are cached and the conversion only runs when the input
changes.
*/

/// Middle C, the default reference for `MidiToTranspo`.
pub const DEFAULT_CENTRE_KEY: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    DbToAmp,
    AmpToDb,
    MidiToFreq,
    FreqToMidi,
    MidiToTranspo { centre_key: f32 },
    CentsToTranspo,
    TranspoToCents,
}

impl Conversion {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Conversion::DbToAmp => pitch::db_to_amp(x),
            Conversion::AmpToDb => pitch::amp_to_db(x),
            Conversion::MidiToFreq => pitch::midi_to_freq(x),
            Conversion::FreqToMidi => pitch::freq_to_midi(x),
            Conversion::MidiToTranspo { centre_key } => pitch::midi_to_transpo(x, centre_key),
            Conversion::CentsToTranspo => pitch::cents_to_transpo(x),
            Conversion::TranspoToCents => pitch::transpo_to_cents(x),
        }
    }
}

pub struct Converter {
    input: Stream,
    conversion: Conversion,
    last_in: f32,
    last_out: f32,
    output: Stream,
    post: MulAdd,
}

impl Converter {
    pub fn new(config: &AudioConfig, input: &Stream, conversion: Conversion) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            input: checked_input(input, config.block_size)?,
            conversion,
            last_in: f32::NAN,
            last_out: 0.0,
            output: Stream::new(config.block_size),
            post: MulAdd::new(config.block_size),
        })
    }

    pub fn conversion(&self) -> Conversion {
        self.conversion
    }

    pub fn set_conversion(&mut self, conversion: Conversion) {
        self.conversion = conversion;
        // NaN never compares equal, so the next sample recomputes.
        self.last_in = f32::NAN;
    }

    pub fn set_mul(&mut self, mul: impl Into<Param>) -> Result<()> {
        self.post.set_mul(mul)
    }

    pub fn set_add(&mut self, add: impl Into<Param>) -> Result<()> {
        self.post.set_add(add)
    }
}

impl Unit for Converter {
    fn compute_next_block(&mut self) {
        let input = self.input.read();
        let mut out = self.output.write();
        for (y, &x) in out.iter_mut().zip(input.iter()) {
            if x != self.last_in {
                self.last_in = x;
                self.last_out = self.conversion.apply(x);
            }
            *y = self.last_out;
        }
        self.post.apply(&mut out);
    }

    fn output(&self) -> Stream {
        self.output.clone()
    }
}
