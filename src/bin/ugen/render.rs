//! Offline render of the demo chain.
//!
//!   tone ─→ [BandSplitter] ─band(i)─→ [Mixer 2ch] ─left──→ [Freeverb] ─→ L
//!                                                  ─right─→ [Freeverb] ─→ R

use std::f32::consts::TAU;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use hound::{SampleFormat, WavSpec, WavWriter};
use saavy_ugen::dsp::mix::{crossfade_gains, PanLaw};
use saavy_ugen::graph::{
    bandsplit::BandSplitter, chain::Chain, mixer::Mixer, reverb::Freeverb, Stream,
};
use saavy_ugen::{AudioConfig, SeedRegistry};

const MIN_FREQ: f32 = 60.0;
const MAX_FREQ: f32 = 12_000.0;
const GAIN_TIME: f32 = 0.05;
const REVERB_DAMP: f32 = 0.5;

pub struct Settings {
    pub freq: f32,
    pub seconds: f32,
    pub bands: usize,
    pub q: f32,
    pub size: f32,
    pub mix: f32,
    pub seed: u64,
}

pub struct Rendered {
    /// Interleaved left/right samples.
    pub stereo: Vec<f32>,
    /// Dry output of each band.
    pub bands: Vec<Vec<f32>>,
    pub centres: Vec<f32>,
}

/// Fundamental plus a fifth and two octaves up, so several bands see energy.
struct Tone {
    phase: f32,
    step: f32,
}

impl Tone {
    fn new(freq: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            step: freq / sample_rate,
        }
    }

    fn fill(&mut self, out: &mut [f32]) {
        for x in out.iter_mut() {
            let p = self.phase * TAU;
            *x = 0.5 * p.sin() + 0.25 * (1.5 * p).sin() + 0.125 * (4.0 * p).sin();
            self.phase = (self.phase + self.step).fract();
        }
    }
}

pub fn render(config: &AudioConfig, settings: &Settings) -> color_eyre::Result<Rendered> {
    let block_size = config.block_size;
    let input = Stream::new(block_size);
    let mut seeds = SeedRegistry::new(settings.seed);
    let mut chain = Chain::new();

    let splitter = BandSplitter::new(
        config,
        &input,
        settings.bands,
        MIN_FREQ,
        MAX_FREQ,
        settings.q,
    )?;
    let centres = splitter.freqs().to_vec();
    let bands: Vec<Stream> = (0..splitter.bands()).map(|i| splitter.band(i)).collect();
    chain.push(splitter);

    // Low bands left, high bands right
    let mut mixer = Mixer::new(config, 2, GAIN_TIME)?;
    let last = bands.len().saturating_sub(1).max(1) as f32;
    for (i, band) in bands.iter().enumerate() {
        let (left, right) = crossfade_gains(PanLaw::EqualPower, i as f32 / last);
        mixer.add_input(i, band)?;
        mixer.set_amp(&i, 0, left);
        mixer.set_amp(&i, 1, right);
    }
    let (dry_left, dry_right) = (mixer.channel(0), mixer.channel(1));
    chain.push(mixer);

    let left = chain.push(Freeverb::new(
        config,
        &dry_left,
        settings.size,
        REVERB_DAMP,
        settings.mix,
        &mut seeds,
    )?);
    let right = chain.push(Freeverb::new(
        config,
        &dry_right,
        settings.size,
        REVERB_DAMP,
        settings.mix,
        &mut seeds,
    )?);

    let frames = config.seconds_to_samples(settings.seconds);
    let blocks = frames.div_ceil(block_size);
    let mut tone = Tone::new(settings.freq, config.sample_rate);
    let mut rendered = Rendered {
        stereo: Vec::with_capacity(blocks * block_size * 2),
        bands: vec![Vec::with_capacity(blocks * block_size); bands.len()],
        centres,
    };

    for _ in 0..blocks {
        tone.fill(&mut input.write());
        chain.process_block();

        let (l, r) = (left.read(), right.read());
        for (&l, &r) in l.iter().zip(r.iter()) {
            rendered.stereo.extend_from_slice(&[l, r]);
        }
        for (dest, band) in rendered.bands.iter_mut().zip(&bands) {
            dest.extend_from_slice(&band.read());
        }
    }

    rendered.stereo.truncate(frames * 2);
    for band in &mut rendered.bands {
        band.truncate(frames);
    }
    Ok(rendered)
}

pub fn write_wav(path: &Path, config: &AudioConfig, stereo: &[f32]) -> color_eyre::Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: config.sample_rate as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)
        .wrap_err_with(|| format!("failed to create {}", path.display()))?;
    for &sample in stereo {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
