//! ugen - offline demo renderer
//!
//! Run with: cargo run --bin ugen -- --freq 440 --output demo.wav
//!
//! Renders a two-tone test signal through a band splitter, spreads the bands
//! across the stereo field, sends the mix through a pair of reverbs and writes
//! the result as a 32-bit float WAV. A spectrum summary of each band is
//! printed afterwards.

mod render;
mod spectrum;

use std::path::PathBuf;

use clap::Parser;
use saavy_ugen::AudioConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ugen")]
#[command(about = "Render a band-split reverb demo to a WAV file", long_about = None)]
struct Args {
    /// Fundamental of the test tone in Hz
    #[arg(short, long, default_value = "220.0")]
    freq: f32,

    /// Length of the render in seconds
    #[arg(short, long, default_value = "4.0")]
    seconds: f32,

    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value = "44100")]
    sample_rate: u32,

    /// Samples per block
    #[arg(short, long, default_value = "256")]
    block_size: usize,

    /// Number of constant-Q bands
    #[arg(long, default_value = "6")]
    bands: usize,

    /// Band Q
    #[arg(short, long, default_value = "3.0")]
    q: f32,

    /// Reverb room size (0..1)
    #[arg(long, default_value = "0.7")]
    size: f32,

    /// Reverb wet amount (0..1)
    #[arg(short, long, default_value = "0.3")]
    mix: f32,

    /// Base seed for reverb jitter
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Output WAV path
    #[arg(short, long, default_value = "ugen.wav")]
    output: PathBuf,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = AudioConfig::new(args.sample_rate as f32, args.block_size)?;

    let settings = render::Settings {
        freq: args.freq,
        seconds: args.seconds,
        bands: args.bands,
        q: args.q,
        size: args.size,
        mix: args.mix,
        seed: args.seed,
    };

    info!(?config, bands = args.bands, "rendering");
    let rendered = render::render(&config, &settings)?;
    render::write_wav(&args.output, &config, &rendered.stereo)?;
    info!(path = %args.output.display(), frames = rendered.stereo.len() / 2, "wrote");

    println!("{:>4}  {:>10}  {:>10}  {:>8}", "band", "centre Hz", "peak Hz", "rms dB");
    for (i, (centre, samples)) in rendered.centres.iter().zip(&rendered.bands).enumerate() {
        let summary = spectrum::summarize(samples, config.sample_rate);
        println!(
            "{:>4}  {:>10.1}  {:>10.1}  {:>8.1}",
            i, centre, summary.peak_freq, summary.rms_db
        );
    }

    Ok(())
}
