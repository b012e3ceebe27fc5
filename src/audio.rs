//! WAV file I/O for staged inputs and decoded outputs
use crate::error::{HarnessError, Result};
use std::path::Path;

/// Helper function to convert f32 samples to i16
/// For each f32 sample, multiply by i16 max, then clamp to valid i16 range
pub fn convert_f32_to_i16(samples: &[f32]) -> Vec<i16>
{
    samples.iter()
           .map(|&sample| (sample * 32767.0).clamp(-32768.0, 32767.0) as i16)
           .collect()
}

/// Inverse of [`convert_f32_to_i16`] scaling, full scale is 32768
pub fn convert_i16_to_f32(samples: &[i16]) -> Vec<f32>
{
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

/// Load WAV file from `Path`
/// Returns the sample vector, sample rate, and number of channels
pub fn load_wav(path: &Path) -> Result<(Vec<f32>, u32, u16)>
{
    let mut reader = hound::WavReader::open(path).map_err(|e| HarnessError::wav(path, e))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format
    {
        hound::SampleFormat::Float =>
        {
            reader.samples::<f32>()
                  .collect::<std::result::Result<Vec<_>, _>>()
                  .map_err(|e| HarnessError::wav(path, e))?
        }
        hound::SampleFormat::Int =>
        {
            // Divide by max sample value to convert i32 samples to f32
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| HarnessError::wav(path, e))?
        }
    };

    Ok((samples, spec.sample_rate, spec.channels))
}

/// Load a mono WAV file, rejecting anything with more than one channel
pub fn load_mono_wav(path: &Path) -> Result<(Vec<f32>, u32)>
{
    let (samples, sample_rate, channels) = load_wav(path)?;
    if channels != 1
    {
        return Err(HarnessError::Format
        {
            path: path.to_path_buf(),
            message: format!("expected mono audio, found {} channels", channels),
        });
    }
    Ok((samples, sample_rate))
}

/// Export `samples` to `Path` as 16-bit PCM WAV
pub fn export_to_wav(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<()>
{
    let spec = hound::WavSpec
    {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| HarnessError::wav(path, e))?;

    for sample in convert_f32_to_i16(samples)
    {
        writer.write_sample(sample).map_err(|e| HarnessError::wav(path, e))?;
    }

    writer.finalize().map_err(|e| HarnessError::wav(path, e))?;
    Ok(())
}
