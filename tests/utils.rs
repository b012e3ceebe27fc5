// Shared test utilities: in-process fake codecs and small fixtures
#![allow(dead_code)]

use codec_sweep::audio::{export_to_wav, load_mono_wav};
use codec_sweep::error::{CellContext, HarnessError, Result, Stage};
use codec_sweep::invoker::{CodecSettings, CodecUnderTest};
use codec_sweep::signals::{synthesize, SignalKind, TestSignal};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One recorded call on a fake codec
#[derive(Debug, Clone, PartialEq)]
pub enum Call
{
    Encode { width: u32, depth: u32, block_size: u32 },
    Decode { width: u32, depth: u32 },
}

/// Fake codec that scales the signal by `1 - 0.1 / depth`, so error falls
/// as depth grows, and pads the decoded stream up to a whole block.
pub struct ScalingCodec
{
    pub calls: RefCell<Vec<Call>>,
    /// Encoder fails with exit status 1 on this (width, depth)
    pub fail_encode_at: Option<(u32, u32)>,
    pub pad_to_block: bool,
    block_size: RefCell<usize>,
}

impl ScalingCodec
{
    pub fn new() -> Self
    {
        ScalingCodec
        {
            calls: RefCell::new(Vec::new()),
            fail_encode_at: None,
            pad_to_block: false,
            block_size: RefCell::new(1),
        }
    }

    pub fn failing_at(width: u32, depth: u32) -> Self
    {
        ScalingCodec { fail_encode_at: Some((width, depth)), ..Self::new() }
    }

    pub fn padding() -> Self
    {
        ScalingCodec { pad_to_block: true, ..Self::new() }
    }

    pub fn calls(&self) -> Vec<Call>
    {
        self.calls.borrow().clone()
    }
}

impl CodecUnderTest for ScalingCodec
{
    fn encode(&self, settings: CodecSettings, cell: &CellContext, input: &Path, output: &Path) -> Result<Duration>
    {
        self.calls.borrow_mut().push(Call::Encode
        {
            width: settings.width,
            depth: settings.depth,
            block_size: settings.block_size,
        });

        if self.fail_encode_at == Some((settings.width, settings.depth))
        {
            return Err(HarnessError::ExternalProcess
            {
                program: PathBuf::from("fake-encode"),
                stage: Stage::Encode,
                exit_code: Some(1),
                stderr: "simulated failure".to_string(),
                cell: cell.clone(),
            });
        }

        let (samples, sample_rate) = load_mono_wav(input)?;
        let gain = 1.0 - 0.1 / settings.depth as f32;
        let scaled: Vec<f32> = samples.iter().map(|s| s * gain).collect();
        export_to_wav(output, &scaled, sample_rate, 1)?;
        *self.block_size.borrow_mut() = settings.block_size as usize;

        Ok(Duration::from_millis(10 * settings.width as u64))
    }

    fn decode(&self, cell: &CellContext, input: &Path, output: &Path) -> Result<()>
    {
        self.calls.borrow_mut().push(Call::Decode { width: cell.width, depth: cell.depth });

        let (mut samples, sample_rate) = load_mono_wav(input)?;
        if self.pad_to_block
        {
            let block = *self.block_size.borrow();
            let padded = samples.len().div_ceil(block) * block;
            samples.resize(padded, 0.0);
        }
        export_to_wav(output, &samples, sample_rate, 1)
    }
}

/// Sine test signal named like the corpus entries
pub fn sine_signal(frequency: f64, sample_rate: u32, duration_seconds: f64) -> TestSignal
{
    let num_samples = (sample_rate as f64 * duration_seconds).round() as usize;
    TestSignal
    {
        name: format!("sin{}Hz.wav", frequency),
        samples: synthesize(SignalKind::Sine { frequency }, sample_rate, num_samples, 0),
        sample_rate,
    }
}
