//! Synthetic test corpus and its on-disk staging
use crate::audio::{export_to_wav, load_mono_wav};
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::reference::{self, Encoder as ReferenceEncoder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalKind
{
    Sine { frequency: f64 },
    Square { frequency: f64 },
    Sawtooth { frequency: f64 },
    /// Linear sweep from `start` to `end` Hz over the whole duration
    Chirp { start: f64, end: f64 },
    WhiteNoise,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalSpec
{
    pub name: String,
    pub kind: SignalKind,
}

impl SignalSpec
{
    fn new(name: &str, kind: SignalKind) -> Self
    {
        SignalSpec { name: name.to_string(), kind }
    }
}

/// A generated waveform, immutable once built
#[derive(Debug, Clone)]
pub struct TestSignal
{
    pub name: String,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl TestSignal
{
    /// File name without extension, used to derive every artifact name
    pub fn stem(&self) -> String
    {
        signal_stem(&self.name)
    }

    pub fn duration_seconds(&self) -> f64
    {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

pub fn signal_stem(name: &str) -> String
{
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// The fixed evaluation corpus, in evaluation order
pub fn corpus_specs() -> Vec<SignalSpec>
{
    let mut specs = Vec::new();
    for frequency in [100.0, 1000.0, 10000.0]
    {
        specs.push(SignalSpec::new(&format!("sin{}Hz.wav", frequency), SignalKind::Sine { frequency }));
        specs.push(SignalSpec::new(&format!("square{}Hz.wav", frequency), SignalKind::Square { frequency }));
        specs.push(SignalSpec::new(&format!("sawtooth{}Hz.wav", frequency), SignalKind::Sawtooth { frequency }));
    }
    specs.push(SignalSpec::new("low_freqency_chirp.wav", SignalKind::Chirp { start: 0.0, end: 5000.0 }));
    specs.push(SignalSpec::new("high_freqency_chirp.wav", SignalKind::Chirp { start: 5000.0, end: 10000.0 }));
    specs.push(SignalSpec::new("white_noise.wav", SignalKind::WhiteNoise));
    specs
}

/// Synthesize `num_samples` samples of one waveform
pub fn synthesize(kind: SignalKind, sample_rate: u32, num_samples: usize, seed: u64) -> Vec<f32>
{
    let duration = num_samples as f64 / sample_rate as f64;
    let time = |i: usize| i as f64 / sample_rate as f64;

    match kind
    {
        SignalKind::Sine { frequency } =>
        {
            (0..num_samples)
                .map(|i| (2.0 * PI * frequency * time(i)).sin() as f32)
                .collect()
        }
        SignalKind::Square { frequency } =>
        {
            (0..num_samples)
                .map(|i| if cycle_position(frequency * time(i)) < 0.5 { 1.0 } else { -1.0 })
                .collect()
        }
        SignalKind::Sawtooth { frequency } =>
        {
            (0..num_samples)
                .map(|i| (2.0 * cycle_position(frequency * time(i)) - 1.0) as f32)
                .collect()
        }
        SignalKind::Chirp { start, end } =>
        {
            let sweep_rate = (end - start) / duration;
            (0..num_samples)
                .map(|i|
                {
                    let t = time(i);
                    let phase = 2.0 * PI * (start * t + 0.5 * sweep_rate * t * t);
                    phase.cos() as f32
                })
                .collect()
        }
        SignalKind::WhiteNoise =>
        {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..num_samples).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
        }
    }
}

/// Fractional part of the number of elapsed cycles, in [0, 1)
fn cycle_position(cycles: f64) -> f64
{
    cycles - cycles.floor()
}

/// Generate every corpus signal selected by the config's filter
pub fn generate_corpus(config: &HarnessConfig) -> Vec<TestSignal>
{
    let num_samples = config.num_samples();
    corpus_specs()
        .into_iter()
        .filter(|spec| config.signal_filter.is_empty() || config.signal_filter.contains(&spec.name))
        .map(|spec| TestSignal
        {
            samples: synthesize(spec.kind, config.sample_rate, num_samples, config.seed),
            sample_rate: config.sample_rate,
            name: spec.name,
        })
        .collect()
}

/// A signal written to disk in both the input and reference formats
#[derive(Debug, Clone)]
pub struct StagedSignal
{
    pub name: String,
    pub pcm_path: PathBuf,
    pub reference_path: PathBuf,
    pub sample_rate: u32,
}

impl StagedSignal
{
    pub fn stem(&self) -> String
    {
        signal_stem(&self.name)
    }

    /// The 16-bit input exactly as the encoder under test reads it
    pub fn load_original(&self) -> Result<Vec<f32>>
    {
        let (samples, _) = load_mono_wav(&self.pcm_path)?;
        Ok(samples)
    }

    /// Baseline reconstruction decoded from the reference file
    pub fn load_reference(&self) -> Result<Vec<f32>>
    {
        let encoded = reference::load_encoded(&self.reference_path)?;
        Ok(reference::Decoder::decode(&encoded))
    }
}

/// Write the 16-bit PCM input and its IMA-ADPCM reference into `dir`
pub fn stage_signal(signal: &TestSignal, dir: &Path) -> Result<StagedSignal>
{
    let pcm_path = dir.join(&signal.name);
    export_to_wav(&pcm_path, &signal.samples, signal.sample_rate, 1)?;

    let reference_path = dir.join(format!("{}_adpcm.bin", signal.stem()));
    let encoded = ReferenceEncoder::new().encode(&signal.samples, signal.sample_rate);
    reference::save_encoded(&encoded, &reference_path)?;

    log::debug!("Staged {} -> {:?}, {:?}", signal.name, pcm_path, reference_path);

    Ok(StagedSignal
    {
        name: signal.name.clone(),
        pcm_path,
        reference_path,
        sample_rate: signal.sample_rate,
    })
}
