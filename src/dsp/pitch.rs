//! Pitch and gain conversions.
//!
//! All conversions assume twelve-tone equal temperament with A4 = 440 Hz =
//! MIDI note 69. Amplitude/decibel conversions floor at -120 dB so silence
//! maps to a finite number and back.

/// Lowest level represented, in decibels.
pub const DB_FLOOR: f32 = -120.0;
/// Amplitude at the decibel floor (10^(-120/20)).
pub const AMP_FLOOR: f32 = 0.000_001;

/// Decibels to linear amplitude. Anything at or below -120 dB is silence.
#[inline]
pub fn db_to_amp(db: f32) -> f32 {
    if db <= DB_FLOOR {
        0.0
    } else {
        10.0_f32.powf(db * 0.05)
    }
}

/// Linear amplitude to decibels, floored at -120 dB.
#[inline]
pub fn amp_to_db(amp: f32) -> f32 {
    if amp <= AMP_FLOOR {
        DB_FLOOR
    } else {
        20.0 * amp.log10()
    }
}

/// MIDI note number to frequency in Hz.
#[inline]
pub fn midi_to_freq(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

/// Frequency in Hz to (fractional) MIDI note number.
#[inline]
pub fn freq_to_midi(freq: f32) -> f32 {
    69.0 + 12.0 * (freq.max(AMP_FLOOR) / 440.0).log2()
}

/// MIDI note to a transposition ratio relative to `centre_key`.
#[inline]
pub fn midi_to_transpo(note: f32, centre_key: f32) -> f32 {
    2.0_f32.powf((note - centre_key) / 12.0)
}

/// Cents to transposition ratio.
#[inline]
pub fn cents_to_transpo(cents: f32) -> f32 {
    2.0_f32.powf(cents / 1200.0)
}

/// Transposition ratio to cents. Non-positive ratios map to the lowest
/// representable ratio.
#[inline]
pub fn transpo_to_cents(transpo: f32) -> f32 {
    1200.0 * transpo.max(AMP_FLOOR).log2()
}
