// Corpus generation and staging
use codec_sweep::config::HarnessConfig;
use codec_sweep::signals::{corpus_specs, generate_corpus, stage_signal, synthesize, SignalKind};

#[test]
fn test_corpus_names()
{
    let names: Vec<String> = corpus_specs().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec![
        "sin100Hz.wav", "square100Hz.wav", "sawtooth100Hz.wav",
        "sin1000Hz.wav", "square1000Hz.wav", "sawtooth1000Hz.wav",
        "sin10000Hz.wav", "square10000Hz.wav", "sawtooth10000Hz.wav",
        "low_freqency_chirp.wav", "high_freqency_chirp.wav", "white_noise.wav",
    ]);
}

#[test]
fn test_every_signal_has_exact_length()
{
    for (sample_rate, duration) in [(44100u32, 4.0f64), (44100, 1.0), (8000, 0.5)]
    {
        let config = HarnessConfig { sample_rate, duration_seconds: duration, ..HarnessConfig::default() };
        let corpus = generate_corpus(&config);
        assert_eq!(corpus.len(), 12);
        for signal in &corpus
        {
            assert_eq!(signal.samples.len(), (sample_rate as f64 * duration) as usize,
                       "{} has the wrong length", signal.name);
            assert_eq!(signal.sample_rate, sample_rate);
            assert!(signal.samples.iter().all(|s| (-1.0..=1.0).contains(s)), "{} leaves [-1, 1]", signal.name);
        }
    }
}

#[test]
fn test_filter_keeps_corpus_order()
{
    let config = HarnessConfig
    {
        duration_seconds: 0.1,
        signal_filter: vec!["white_noise.wav".to_string(), "sin1000Hz.wav".to_string()],
        ..HarnessConfig::default()
    };
    let names: Vec<String> = generate_corpus(&config).into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["sin1000Hz.wav", "white_noise.wav"]);
}

#[test]
fn test_white_noise_follows_seed()
{
    let a = synthesize(SignalKind::WhiteNoise, 44100, 4410, 7);
    let b = synthesize(SignalKind::WhiteNoise, 44100, 4410, 7);
    let c = synthesize(SignalKind::WhiteNoise, 44100, 4410, 8);

    assert_eq!(a, b, "same seed must give the same noise");
    assert_ne!(a, c, "different seeds should differ");
    assert!(a.iter().all(|s| (-1.0..1.0).contains(s)));

    let mean: f32 = a.iter().sum::<f32>() / a.len() as f32;
    assert!(mean.abs() < 0.05, "noise should be roughly zero-mean, got {}", mean);
}

#[test]
fn test_periodic_waveform_shapes()
{
    // 100 Hz at 8 kHz is 80 samples per period
    let square = synthesize(SignalKind::Square { frequency: 100.0 }, 8000, 160, 0);
    assert!(square[..40].iter().all(|&s| s == 1.0));
    assert!(square[41..80].iter().all(|&s| s == -1.0));
    assert_eq!(square[81], 1.0);

    let saw = synthesize(SignalKind::Sawtooth { frequency: 100.0 }, 8000, 160, 0);
    assert_eq!(saw[0], -1.0);
    assert!((saw[40] - 0.0).abs() < 1e-6);
    assert!(saw[..80].windows(2).all(|w| w[1] > w[0]), "sawtooth should rise within a period");
    assert!(saw[81] < saw[79]);

    let sine = synthesize(SignalKind::Sine { frequency: 100.0 }, 8000, 160, 0);
    assert_eq!(sine[0], 0.0);
    assert!((sine[20] - 1.0).abs() < 1e-6);
}

#[test]
fn test_chirp_starts_at_peak_and_sweeps()
{
    let sample_rate = 44100;
    let chirp = synthesize(SignalKind::Chirp { start: 0.0, end: 5000.0 }, sample_rate, sample_rate as usize, 0);
    assert_eq!(chirp[0], 1.0);

    // Zero crossings per 100 ms window grow as the frequency rises
    let crossings = |window: &[f32]| window.windows(2).filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0)).count();
    let early = crossings(&chirp[..4410]);
    let late = crossings(&chirp[chirp.len() - 4410..]);
    println!("zero crossings: early {}, late {}", early, late);
    assert!(late > early * 5);
}

#[test]
fn test_staging_writes_pcm_and_reference()
{
    let dir = tempfile::tempdir().expect("tempdir");
    let config = HarnessConfig { duration_seconds: 0.5, ..HarnessConfig::default() };
    let corpus = generate_corpus(&config);
    let signal = corpus.iter().find(|s| s.name == "sawtooth1000Hz.wav").expect("sawtooth in corpus");

    let staged = stage_signal(signal, dir.path()).expect("staging failed");
    assert_eq!(staged.pcm_path, dir.path().join("sawtooth1000Hz.wav"));
    assert_eq!(staged.reference_path, dir.path().join("sawtooth1000Hz_adpcm.bin"));
    assert!(staged.pcm_path.exists());
    assert!(staged.reference_path.exists());

    let original = staged.load_original().expect("load original");
    let reference = staged.load_reference().expect("load reference");
    assert_eq!(original.len(), signal.samples.len());
    assert_eq!(reference.len(), signal.samples.len());

    // 16-bit quantisation only
    for (a, b) in original.iter().zip(&signal.samples)
    {
        assert!((a - b).abs() < 1e-4);
    }
}
