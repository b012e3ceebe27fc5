//! Out-of-process driver for the codec under test
use crate::error::{CellContext, HarnessError, Result, Stage};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

/// One (width, depth, block size) configuration of the codec under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecSettings
{
    pub width: u32,
    pub depth: u32,
    pub block_size: u32,
}

/// A codec that can be driven one grid cell at a time.
///
/// `encode` returns the wall-clock time of exactly one encoder run.
/// Any failure is fatal to the sweep, so implementations must not retry.
pub trait CodecUnderTest
{
    fn encode(&self, settings: CodecSettings, cell: &CellContext, input: &Path, output: &Path) -> Result<Duration>;

    fn decode(&self, cell: &CellContext, input: &Path, output: &Path) -> Result<()>;
}

/// Runs `encode` / `decode` executables with structured argument lists
#[derive(Debug, Clone)]
pub struct ExternalCodec
{
    encoder: PathBuf,
    decoder: PathBuf,
}

impl ExternalCodec
{
    pub fn new(encoder: impl Into<PathBuf>, decoder: impl Into<PathBuf>) -> Self
    {
        ExternalCodec
        {
            encoder: encoder.into(),
            decoder: decoder.into(),
        }
    }

    /// `--width W --depth D --block-size B <input> <output>`
    pub fn encode_args(settings: CodecSettings, input: &Path, output: &Path) -> Vec<std::ffi::OsString>
    {
        vec![
            "--width".into(),
            settings.width.to_string().into(),
            "--depth".into(),
            settings.depth.to_string().into(),
            "--block-size".into(),
            settings.block_size.to_string().into(),
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ]
    }

    fn run(program: &Path, stage: Stage, cell: &CellContext, command: &mut Command) -> Result<Output>
    {
        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| HarnessError::Spawn
            {
                program: program.to_path_buf(),
                stage,
                cell: cell.clone(),
                source,
            })?;

        if !output.status.success()
        {
            return Err(HarnessError::ExternalProcess
            {
                program: program.to_path_buf(),
                stage,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                cell: cell.clone(),
            });
        }

        Ok(output)
    }
}

impl CodecUnderTest for ExternalCodec
{
    fn encode(&self, settings: CodecSettings, cell: &CellContext, input: &Path, output: &Path) -> Result<Duration>
    {
        let mut command = Command::new(&self.encoder);
        command.args(Self::encode_args(settings, input, output));

        let start = Instant::now();
        Self::run(&self.encoder, Stage::Encode, cell, &mut command)?;
        let elapsed = start.elapsed();

        log::debug!("Encoded {} in {:.3}s", cell, elapsed.as_secs_f64());
        Ok(elapsed)
    }

    fn decode(&self, cell: &CellContext, input: &Path, output: &Path) -> Result<()>
    {
        let mut command = Command::new(&self.decoder);
        command.arg(input).arg(output);
        Self::run(&self.decoder, Stage::Decode, cell, &mut command)?;
        Ok(())
    }
}
