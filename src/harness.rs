//! Top-level sweep: stage the corpus, sweep every signal, render, persist
use crate::aggregate::{self, SignalReport, SweepInput};
use crate::config::{HarnessConfig, ParameterGrid};
use crate::error::{HarnessError, Result};
use crate::invoker::{CodecUnderTest, ExternalCodec};
use crate::metrics::Baseline;
use crate::plot;
use crate::signals::{self, StagedSignal};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const REPORT_FILE: &str = "sweep_report.bin";

pub enum Progress
{
    SignalStarted { signal: String, index: usize, total: usize },
    CellMeasured { signal: String, width: u32, depth: u32, time_ratio: f64, mse_ratio: f64 },
    HeatmapWritten(PathBuf),
    Complete(String),
}

/// Every signal's matrices plus the settings they were measured with
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SweepReport
{
    pub sample_rate: u32,
    pub duration_seconds: f64,
    pub grid: ParameterGrid,
    pub seed: u64,
    pub signals: Vec<SignalReport>,
}

pub fn save_report(report: &SweepReport, path: &Path) -> Result<()>
{
    let data = bincode::serialize(report).map_err(|e| HarnessError::Artifact { path: path.to_path_buf(), source: e })?;
    std::fs::write(path, data).map_err(|e| HarnessError::io(path, e))?;
    Ok(())
}

pub fn load_report(path: &Path) -> Result<SweepReport>
{
    let data = std::fs::read(path).map_err(|e| HarnessError::io(path, e))?;
    bincode::deserialize(&data).map_err(|e| HarnessError::Artifact { path: path.to_path_buf(), source: e })
}

fn notify(progress: Option<&Sender<Progress>>, event: Progress)
{
    if let Some(sender) = progress
    {
        let _ = sender.send(event);
    }
}

/// Baseline for one staged signal, then its full grid
pub fn evaluate_signal<C: CodecUnderTest>(
    codec: &C,
    config: &HarnessConfig,
    staged: &StagedSignal,
    progress: Option<&Sender<Progress>>,
) -> Result<SignalReport>
{
    let original = staged.load_original()?;
    let reference = staged.load_reference()?;
    let baseline = Baseline::new(&staged.name, &original, &reference)?;
    log::info!("{}: baseline MSE {:.3e}", staged.name, baseline.mse());

    let input = SweepInput
    {
        signal_name: &staged.name,
        input_path: staged.pcm_path.clone(),
        original: &original,
        sample_rate: staged.sample_rate,
        baseline,
        scratch_dir: config.work_dir.clone(),
    };
    aggregate::sweep_signal(codec, &config.grid, &input, progress)
}

/// Run the whole evaluation with any codec implementation.
///
/// Signals are generated and staged first, then swept one at a time. The
/// first error aborts the run; heatmaps for a signal are only rendered once
/// its grid is complete, and the report is only written when every signal is.
pub fn run_with_codec<C: CodecUnderTest>(
    codec: &C,
    config: &HarnessConfig,
    progress: Option<&Sender<Progress>>,
) -> Result<SweepReport>
{
    config.validate()?;
    let start_time = Instant::now();

    for dir in [&config.work_dir, &config.output_dir]
    {
        std::fs::create_dir_all(dir).map_err(|e| HarnessError::io(dir.as_path(), e))?;
    }

    let corpus = signals::generate_corpus(config);
    if corpus.is_empty()
    {
        return Err(HarnessError::InvalidConfig(format!(
            "signal filter {:?} matches nothing in the corpus",
            config.signal_filter
        )));
    }

    let staged = corpus
        .iter()
        .map(|signal| signals::stage_signal(signal, &config.work_dir))
        .collect::<Result<Vec<_>>>()?;
    log::info!("Staged {} signals of {} samples in {:?}", staged.len(), config.num_samples(), config.work_dir);

    let mut reports = Vec::with_capacity(staged.len());
    for (index, signal) in staged.iter().enumerate()
    {
        log::info!("[{}/{}] {}", index + 1, staged.len(), signal.name);
        notify(progress, Progress::SignalStarted
        {
            signal: signal.name.clone(),
            index,
            total: staged.len(),
        });

        let report = evaluate_signal(codec, config, signal, progress)?;
        if config.render_heatmaps
        {
            for path in plot::render_report(&report, &config.output_dir)?
            {
                notify(progress, Progress::HeatmapWritten(path));
            }
        }
        reports.push(report);
    }

    let report = SweepReport
    {
        sample_rate: config.sample_rate,
        duration_seconds: config.duration_seconds,
        grid: config.grid,
        seed: config.seed,
        signals: reports,
    };
    let report_path = config.output_dir.join(REPORT_FILE);
    save_report(&report, &report_path)?;

    let summary = format!(
        "Swept {} signals x {} cells in {:.1}s, report at {:?}",
        report.signals.len(),
        config.grid.num_cells(),
        start_time.elapsed().as_secs_f32(),
        report_path
    );
    log::info!("{}", summary);
    notify(progress, Progress::Complete(summary));

    Ok(report)
}

/// Run the evaluation against the external `encode` / `decode` executables
pub fn run(config: &HarnessConfig, progress: Option<&Sender<Progress>>) -> Result<SweepReport>
{
    let codec = ExternalCodec::new(&config.encoder, &config.decoder);
    run_with_codec(&codec, config, progress)
}

/// Re-render every heatmap of a saved report
pub fn render_saved(report: &SweepReport, output_dir: &Path) -> Result<Vec<PathBuf>>
{
    std::fs::create_dir_all(output_dir).map_err(|e| HarnessError::io(output_dir, e))?;
    let mut written = Vec::new();
    for signal in &report.signals
    {
        written.extend(plot::render_report(signal, output_dir)?);
    }
    Ok(written)
}
