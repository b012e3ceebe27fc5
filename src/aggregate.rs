//! Per-signal width x depth sweep and its result matrices
use crate::audio::load_mono_wav;
use crate::config::ParameterGrid;
use crate::error::{CellContext, HarnessError, Result};
use crate::harness::Progress;
use crate::invoker::{CodecSettings, CodecUnderTest};
use crate::metrics::{self, Baseline};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENCODED_SCRATCH_FILE: &str = "compressed.bin";
pub const DECODED_SCRATCH_FILE: &str = "decoded.wav";

/// Dense row-major matrix, rows indexed by width and columns by depth
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultMatrix
{
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ResultMatrix
{
    pub fn new(rows: usize, cols: usize) -> Self
    {
        ResultMatrix
        {
            rows,
            cols,
            values: vec![f64::NAN; rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize)
    {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64
    {
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64)
    {
        assert!(row < self.rows && col < self.cols, "cell ({}, {}) outside {}x{} matrix", row, col, self.rows, self.cols);
        self.values[row * self.cols + col] = value;
    }

    /// Unfilled cells hold NaN until written
    pub fn is_complete(&self) -> bool
    {
        self.values.iter().all(|v| !v.is_nan())
    }

    pub fn row(&self, row: usize) -> &[f64]
    {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    pub fn min(&self) -> f64
    {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Transient result of one codec round trip
#[derive(Debug, Clone)]
pub struct Measurement
{
    pub cell: CellContext,
    pub encode_time: Duration,
    pub decoded_samples: Vec<f32>,
}

/// Everything measured for one signal
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignalReport
{
    pub signal_name: String,
    pub widths: Vec<u32>,
    pub depths: Vec<u32>,
    pub baseline_mse: f64,
    pub time_ratio: ResultMatrix,
    pub mse_ratio: ResultMatrix,
}

/// Inputs shared by every cell of one signal's sweep
pub struct SweepInput<'a>
{
    pub signal_name: &'a str,
    pub input_path: PathBuf,
    pub original: &'a [f32],
    pub sample_rate: u32,
    pub baseline: Baseline,
    /// Directory for the scratch encoded and decoded files
    pub scratch_dir: PathBuf,
}

/// Remove a scratch file left by the previous cell
fn clear_scratch(path: &Path) -> Result<()>
{
    match std::fs::remove_file(path)
    {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HarnessError::io(path, e)),
    }
}

/// Encode once (timed), decode once, and read the reconstruction back
pub fn measure_cell<C: CodecUnderTest>(
    codec: &C,
    input: &SweepInput<'_>,
    settings: CodecSettings,
) -> Result<Measurement>
{
    let cell = CellContext::new(input.signal_name, settings.width, settings.depth);
    let encoded_path = input.scratch_dir.join(ENCODED_SCRATCH_FILE);
    let decoded_path = input.scratch_dir.join(DECODED_SCRATCH_FILE);
    clear_scratch(&encoded_path).map_err(|e| e.in_cell(&cell))?;
    clear_scratch(&decoded_path).map_err(|e| e.in_cell(&cell))?;

    let encode_time = codec.encode(settings, &cell, &input.input_path, &encoded_path)?;
    codec.decode(&cell, &encoded_path, &decoded_path)?;

    let (decoded_samples, decoded_rate) = load_mono_wav(&decoded_path).map_err(|e| e.in_cell(&cell))?;
    if decoded_rate != input.sample_rate
    {
        let mismatch = HarnessError::Format
        {
            path: decoded_path,
            message: format!("decoded at {} Hz, input is {} Hz", decoded_rate, input.sample_rate),
        };
        return Err(mismatch.in_cell(&cell));
    }
    if decoded_samples.is_empty()
    {
        return Err(HarnessError::EmptyReconstruction { cell });
    }

    Ok(Measurement
    {
        cell,
        encode_time,
        decoded_samples,
    })
}

/// Walk widths (outer) x depths (inner), filling a fresh pair of matrices
pub fn sweep_signal<C: CodecUnderTest>(
    codec: &C,
    grid: &ParameterGrid,
    input: &SweepInput<'_>,
    progress: Option<&Sender<Progress>>,
) -> Result<SignalReport>
{
    let widths = grid.widths();
    let depths = grid.depths();
    let (rows, cols) = grid.shape();
    let mut time_ratio = ResultMatrix::new(rows, cols);
    let mut mse_ratio = ResultMatrix::new(rows, cols);
    let duration = input.original.len() as f64 / input.sample_rate as f64;

    for (x, &width) in widths.iter().enumerate()
    {
        for (y, &depth) in depths.iter().enumerate()
        {
            let settings = CodecSettings { width, depth, block_size: grid.block_size };
            let measurement = measure_cell(codec, input, settings)?;

            // Non-empty on both sides, checked above and by the caller
            let cell_mse = metrics::mse(input.original, &measurement.decoded_samples)
                .ok_or_else(|| HarnessError::EmptyReconstruction { cell: measurement.cell.clone() })?;
            let cell_mse_ratio = input.baseline.mse_ratio(cell_mse);
            let cell_time_ratio = metrics::time_ratio(measurement.encode_time, duration);

            mse_ratio.set(x, y, cell_mse_ratio);
            time_ratio.set(x, y, cell_time_ratio);

            log::debug!("{}: time {:.1}%, MSE {:.1}%", measurement.cell, cell_time_ratio, cell_mse_ratio);
            if let Some(sender) = progress
            {
                let _ = sender.send(Progress::CellMeasured
                {
                    signal: input.signal_name.to_string(),
                    width,
                    depth,
                    time_ratio: cell_time_ratio,
                    mse_ratio: cell_mse_ratio,
                });
            }
        }
    }

    debug_assert!(time_ratio.is_complete() && mse_ratio.is_complete());

    Ok(SignalReport
    {
        signal_name: input.signal_name.to_string(),
        widths,
        depths,
        baseline_mse: input.baseline.mse(),
        time_ratio,
        mse_ratio,
    })
}
