//! Run-wide configuration, fixed for the whole sweep
use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_DURATION_SECONDS: f64 = 4.0;
pub const DEFAULT_MAX_WIDTH: u32 = 16;
pub const DEFAULT_MAX_DEPTH: u32 = 6;
pub const DEFAULT_BLOCK_SIZE: u32 = 256;
pub const DEFAULT_SEED: u64 = 0x5EED;
/// Upper bound on each grid axis
pub const MAX_GRID_AXIS: u32 = 1024;

/// The width x depth search space swept for every signal
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterGrid
{
    pub max_width: u32,
    pub max_depth: u32,
    pub block_size: u32,
}

impl Default for ParameterGrid
{
    fn default() -> Self
    {
        ParameterGrid
        {
            max_width: DEFAULT_MAX_WIDTH,
            max_depth: DEFAULT_MAX_DEPTH,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ParameterGrid
{
    /// Row axis of the result matrices, `1..=max_width`
    pub fn widths(&self) -> Vec<u32>
    {
        (1..=self.max_width).collect()
    }

    /// Column axis of the result matrices, `1..=max_depth`
    pub fn depths(&self) -> Vec<u32>
    {
        (1..=self.max_depth).collect()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize)
    {
        (self.max_width as usize, self.max_depth as usize)
    }

    pub fn num_cells(&self) -> u64
    {
        self.max_width as u64 * self.max_depth as u64
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig
{
    pub sample_rate: u32,
    pub duration_seconds: f64,
    pub grid: ParameterGrid,
    /// Seed for the white noise signal
    pub seed: u64,
    pub encoder: PathBuf,
    pub decoder: PathBuf,
    /// Where staged inputs and scratch codec files are written
    pub work_dir: PathBuf,
    /// Where heatmaps and the sweep report are written
    pub output_dir: PathBuf,
    /// Restrict the corpus to these file names; empty means all
    pub signal_filter: Vec<String>,
    pub render_heatmaps: bool,
}

impl Default for HarnessConfig
{
    fn default() -> Self
    {
        HarnessConfig
        {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_seconds: DEFAULT_DURATION_SECONDS,
            grid: ParameterGrid::default(),
            seed: DEFAULT_SEED,
            encoder: PathBuf::from("encode"),
            decoder: PathBuf::from("decode"),
            work_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            signal_filter: Vec::new(),
            render_heatmaps: true,
        }
    }
}

impl HarnessConfig
{
    pub fn validate(&self) -> Result<()>
    {
        if self.sample_rate == 0
        {
            return Err(HarnessError::InvalidConfig("sample rate must be positive".into()));
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0
        {
            return Err(HarnessError::InvalidConfig(format!(
                "duration must be a positive number of seconds, got {}",
                self.duration_seconds
            )));
        }
        if self.grid.max_width == 0 || self.grid.max_depth == 0
        {
            return Err(HarnessError::InvalidConfig("grid needs at least one width and one depth".into()));
        }
        if self.grid.max_width > MAX_GRID_AXIS || self.grid.max_depth > MAX_GRID_AXIS
        {
            return Err(HarnessError::InvalidConfig(format!(
                "grid {}x{} exceeds {} on an axis",
                self.grid.max_width, self.grid.max_depth, MAX_GRID_AXIS
            )));
        }
        if self.grid.block_size == 0
        {
            return Err(HarnessError::InvalidConfig("block size must be positive".into()));
        }
        if self.num_samples() == 0
        {
            return Err(HarnessError::InvalidConfig("duration is shorter than one sample".into()));
        }
        Ok(())
    }

    /// Samples per generated signal
    pub fn num_samples(&self) -> usize
    {
        (self.sample_rate as f64 * self.duration_seconds).round() as usize
    }
}
