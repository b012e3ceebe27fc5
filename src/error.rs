//! Error taxonomy for the sweep harness
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Identifies one grid cell so a failure can be reproduced by hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellContext
{
    pub signal: String,
    pub width: u32,
    pub depth: u32,
}

impl CellContext
{
    pub fn new(signal: &str, width: u32, depth: u32) -> Self
    {
        CellContext
        {
            signal: signal.to_string(),
            width,
            depth,
        }
    }
}

impl fmt::Display for CellContext
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "signal {} (width {}, depth {})", self.signal, self.width, self.depth)
    }
}

/// Which half of a codec round trip was running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage
{
    Encode,
    Decode,
}

impl fmt::Display for Stage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            Stage::Encode => write!(f, "encoder"),
            Stage::Decode => write!(f, "decoder"),
        }
    }
}

#[derive(Debug, Error)]
pub enum HarnessError
{
    #[error("{stage} `{}` exited with {} for {cell}: {stderr}", .program.display(), describe_exit(.exit_code))]
    ExternalProcess
    {
        program: PathBuf,
        stage: Stage,
        exit_code: Option<i32>,
        stderr: String,
        cell: CellContext,
    },

    #[error("failed to start {stage} `{}` for {cell}: {source}", .program.display())]
    Spawn
    {
        program: PathBuf,
        stage: Stage,
        cell: CellContext,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WAV error on {path:?}: {source}")]
    Wav
    {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("unsupported audio in {path:?}: {message}")]
    Format
    {
        path: PathBuf,
        message: String,
    },

    #[error("failed to read or write artifact {path:?}: {source}")]
    Artifact
    {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to render {path:?}: {message}")]
    Render
    {
        path: PathBuf,
        message: String,
    },

    #[error("baseline reconstruction of {signal} is perfect (MSE = 0), MSE ratio is undefined")]
    DegenerateBaseline
    {
        signal: String,
    },

    #[error("decoder produced no samples for {cell}")]
    EmptyReconstruction
    {
        cell: CellContext,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Any other failure while measuring one grid cell
    #[error("{cell}: {source}")]
    Cell
    {
        cell: CellContext,
        #[source]
        source: Box<HarnessError>,
    },
}

fn describe_exit(code: &Option<i32>) -> String
{
    match code
    {
        Some(c) => format!("status {}", c),
        None => "no status (killed by signal)".to_string(),
    }
}

impl HarnessError
{
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self
    {
        HarnessError::Io { path: path.into(), source }
    }

    pub fn wav(path: impl Into<PathBuf>, source: hound::Error) -> Self
    {
        HarnessError::Wav { path: path.into(), source }
    }

    /// Attach the failing cell, unless the error already names it
    pub fn in_cell(self, cell: &CellContext) -> Self
    {
        let named = matches!(
            self,
            HarnessError::ExternalProcess { .. }
                | HarnessError::Spawn { .. }
                | HarnessError::EmptyReconstruction { .. }
                | HarnessError::Cell { .. }
        );
        if named
        {
            return self;
        }
        HarnessError::Cell { cell: cell.clone(), source: Box::new(self) }
    }
}
