//! Error metric and the two normalizations applied to every cell
//!
//! The MSE ratio is relative to the IMA-ADPCM baseline, the time ratio is
//! relative to the signal's own real-time duration. They share nothing but
//! the percent scale and are kept as separate functions on purpose.
use crate::error::{HarnessError, Result};
use std::time::Duration;

/// Mean squared error over the overlapping prefix of `a` and `b`.
///
/// Reconstructions may be longer than the source because of block padding,
/// so the longer input is truncated. Returns `None` when either is empty.
pub fn mse(a: &[f32], b: &[f32]) -> Option<f64>
{
    let len = a.len().min(b.len());
    if len == 0
    {
        return None;
    }

    let sum: f64 = a[..len]
        .iter()
        .zip(&b[..len])
        .map(|(&x, &y)|
        {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();

    Some(sum / len as f64)
}

/// MSE of the reference reconstruction, the denominator of every MSE ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline
{
    mse: f64,
}

impl Baseline
{
    /// Fails with [`HarnessError::DegenerateBaseline`] when the reference is
    /// a perfect (or empty) reconstruction, since every ratio would be undefined
    pub fn new(signal: &str, original: &[f32], reference: &[f32]) -> Result<Self>
    {
        match mse(original, reference)
        {
            Some(mse) if mse > 0.0 && mse.is_finite() => Ok(Baseline { mse }),
            _ => Err(HarnessError::DegenerateBaseline { signal: signal.to_string() }),
        }
    }

    pub fn mse(&self) -> f64
    {
        self.mse
    }

    /// `100 * cell_mse / baseline_mse`
    pub fn mse_ratio(&self, cell_mse: f64) -> f64
    {
        100.0 * cell_mse / self.mse
    }
}

/// `100 * encode_time / signal_duration`
pub fn time_ratio(encode_time: Duration, signal_duration_seconds: f64) -> f64
{
    100.0 * encode_time.as_secs_f64() / signal_duration_seconds
}
