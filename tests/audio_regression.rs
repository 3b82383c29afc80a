use std::f32::consts::TAU;

use saavy_ugen::dsp::impulse::WinSincType;
use saavy_ugen::graph::{
    bandsplit::BandSplitter,
    chain::Chain,
    convolve::Convolve,
    ir::IrWinSinc,
    mixer::Mixer,
    multiband::FourBand,
    resample::{Resample, ResampleMode},
    reverb::Freeverb,
    scale::Scale,
    sig::{Sig, SigTo},
    tap::Tap,
    Stream, Unit,
};
use saavy_ugen::{AudioConfig, SeedRegistry};

fn config(block_size: usize) -> AudioConfig {
    AudioConfig::new(44_100.0, block_size).unwrap()
}

fn sine_block(phase: &mut f32, freq: f32, sample_rate: f32, out: &mut [f32]) {
    for x in out.iter_mut() {
        *x = (*phase * TAU).sin();
        *phase = (*phase + freq / sample_rate).fract();
    }
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
}

#[test]
fn bandsplitter_routes_1khz_to_nearest_band() {
    let config = config(256);
    let input = Stream::new(256);
    let mut splitter = BandSplitter::new(&config, &input, 4, 100.0, 10_000.0, 2.0).unwrap();
    let bands: Vec<Stream> = (0..4).map(|i| splitter.band(i)).collect();

    let mut phase = 0.0;
    let mut energy = vec![Vec::new(); 4];
    for block in 0..60 {
        sine_block(&mut phase, 1000.0, config.sample_rate, &mut input.write());
        splitter.compute_next_block();
        if block >= 20 {
            for (dest, band) in energy.iter_mut().zip(&bands) {
                dest.extend_from_slice(&band.read());
            }
        }
    }

    let levels: Vec<f32> = energy.iter().map(|b| rms(b)).collect();
    let loudest = levels
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(loudest, 2, "band levels: {:?}", levels);
}

#[test]
fn fourband_sum_reconstructs_input_level() {
    let config = config(128);
    let input = Stream::new(128);
    let mut split = FourBand::new(&config, &input).unwrap();
    let bands: Vec<Stream> = (0..4).map(|i| split.band(i)).collect();

    for &freq in &[80.0, 1000.0, 6000.0] {
        split.reset();
        let mut phase = 0.0;
        let mut dry = Vec::new();
        let mut sum = Vec::new();
        for block in 0..300 {
            sine_block(&mut phase, freq, config.sample_rate, &mut input.write());
            split.compute_next_block();
            if block >= 100 {
                dry.extend_from_slice(&input.read());
                let mut mixed = vec![0.0; 128];
                for band in &bands {
                    for (m, &x) in mixed.iter_mut().zip(band.read().iter()) {
                        *m += x;
                    }
                }
                sum.extend(mixed);
            }
        }
        let ratio = rms(&sum) / rms(&dry);
        assert!(
            (ratio - 1.0).abs() < 0.02,
            "sum of bands at {} Hz has gain {}",
            freq,
            ratio
        );
    }
}

#[test]
fn identity_and_zero_impulses() {
    let config = config(64);
    let samples: Vec<f32> = (0..64).map(|i| (i as f32 * 0.3).sin()).collect();
    let input = Stream::from_slice(&samples);

    let mut identity = Convolve::new(&config, &input, &[1.0, 0.0, 0.0, 0.0]).unwrap();
    let mut silence = Convolve::new(&config, &input, &[0.0; 16]).unwrap();
    for _ in 0..3 {
        identity.compute_next_block();
        silence.compute_next_block();
        assert_eq!(identity.output().to_vec(), samples);
        assert!(silence.output().read().iter().all(|&x| x == 0.0));
    }
}

#[test]
fn winsinc_lowpass_plus_highpass_passes_input() {
    let config = config(128);
    let input = Stream::new(128);
    let mut low = IrWinSinc::new(&config, &input, 2000.0, 0.0, WinSincType::LowPass, 64).unwrap();
    let mut high = IrWinSinc::new(&config, &input, 2000.0, 0.0, WinSincType::HighPass, 64).unwrap();

    // Linear-phase pair: the sum is the input delayed by order / 2
    let delay = 32;
    let mut phase = 0.0;
    let mut dry = Vec::new();
    let mut wet = Vec::new();
    for _ in 0..8 {
        sine_block(&mut phase, 3100.0, config.sample_rate, &mut input.write());
        low.compute_next_block();
        high.compute_next_block();
        dry.extend_from_slice(&input.read());
        let (l, h) = (low.output(), high.output());
        wet.extend(l.read().iter().zip(h.read().iter()).map(|(a, b)| a + b));
    }

    for n in delay..wet.len() {
        assert!(
            (wet[n] - dry[n - delay]).abs() < 1e-4,
            "mismatch at {}: {} vs {}",
            n,
            wet[n],
            dry[n - delay]
        );
    }
}

#[test]
fn freeverb_reset_matches_fresh_instance() {
    let config = config(256);
    let mut rng = fastrand::Rng::with_seed(3);
    let blocks: Vec<Vec<f32>> = (0..12)
        .map(|_| (0..256).map(|_| rng.f32() * 2.0 - 1.0).collect())
        .collect();
    let input = Stream::new(256);

    let mut used =
        Freeverb::new(&config, &input, 0.8, 0.3, 0.6, &mut SeedRegistry::new(7)).unwrap();
    for block in &blocks {
        input.copy_from(block);
        used.compute_next_block();
    }
    used.reset();

    let mut fresh =
        Freeverb::new(&config, &input, 0.8, 0.3, 0.6, &mut SeedRegistry::new(7)).unwrap();
    for block in &blocks {
        input.copy_from(block);
        used.compute_next_block();
        fresh.compute_next_block();
        assert_eq!(used.output().to_vec(), fresh.output().to_vec());
    }
}

#[test]
fn sigto_reaches_target_after_ramp_time() {
    // 10 blocks of 441 samples = 0.1 s at 44.1 kHz
    let config = config(441);
    let mut glide = SigTo::new(&config, 1.0, 0.1, 0.0).unwrap();

    let mut rendered = Vec::new();
    for _ in 0..12 {
        glide.compute_next_block();
        rendered.extend_from_slice(&glide.output().read());
    }

    assert!(rendered[4408] < 1.0);
    assert_eq!(rendered[4409], 1.0);
    assert!(rendered[4409..].iter().all(|&x| x == 1.0));
}

#[test]
fn mixer_retarget_mid_ramp_is_continuous() {
    let config = config(100);
    let input = Stream::from_slice(&[1.0; 100]);
    let mut mixer = Mixer::new(&config, 1, 0.01).unwrap();
    mixer.add_input("lead", &input).unwrap();
    mixer.set_amp(&"lead", 0, 1.0);

    let out = mixer.channel(0);
    let mut rendered = Vec::new();
    for block in 0..10 {
        if block == 2 {
            mixer.set_amp(&"lead", 0, 0.0);
        }
        mixer.compute_next_block();
        rendered.extend_from_slice(&out.read());
    }

    // 441-sample ramp: no step may exceed 1 / 441
    let max_step = 1.0 / 441.0 + 1e-6;
    for pair in rendered.windows(2) {
        assert!((pair[1] - pair[0]).abs() <= max_step);
    }
    assert_eq!(*rendered.last().unwrap(), 0.0);
}

#[test]
fn scale_maps_forward_and_reversed_ranges() {
    let config = config(32);
    let input = Stream::from_slice(&[0.5; 32]);
    let mut forward = Scale::new(&config, &input, 0.0, 1.0, 10.0, 20.0, 1.0).unwrap();
    let mut reversed = Scale::new(&config, &input, 1.0, 0.0, 20.0, 10.0, 1.0).unwrap();
    forward.compute_next_block();
    reversed.compute_next_block();
    assert!(forward.output().read().iter().all(|&x| (x - 15.0).abs() < 1e-5));
    assert!(reversed.output().read().iter().all(|&x| (x - 15.0).abs() < 1e-5));
}

#[test]
fn chain_runs_oversampled_section() {
    let config = config(64);
    let oversampled = config.with_block_size(128);

    let mut chain = Chain::new();
    let level = chain.push(Sig::new(&config, 0.5).unwrap());
    let mut gain = Tap::new(&config, &level).unwrap();
    gain.set_mul(2.0).unwrap();
    let gained = chain.push(gain);
    let up = chain.push(Resample::up(&config, &gained, 2, ResampleMode::Hold).unwrap());
    let down = chain.push(Resample::down(&oversampled, &up, 2, ResampleMode::Hold).unwrap());

    for _ in 0..4 {
        chain.process_block();
        assert_eq!(up.len(), 128);
        assert_eq!(down.to_vec(), vec![1.0; 64]);
    }
}
