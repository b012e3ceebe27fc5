use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use codec_sweep::config::{self, HarnessConfig, ParameterGrid};
use codec_sweep::harness::{self, Progress};
use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::thread;

/// Sweep an external block ADPCM encoder over search width and depth
#[derive(Parser, Debug)]
#[command(version)]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command
{
    /// Generate the corpus, run the full sweep and render heatmaps
    Run(RunArgs),
    /// Re-render heatmaps from a saved sweep report
    Render
    {
        /// Report written by a previous `run`
        report: PathBuf,

        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs
{
    /// Encoder executable, called as `<encoder> --width W --depth D --block-size B <in> <out>`
    #[arg(long, default_value = "encode")]
    encoder: PathBuf,

    /// Decoder executable, called as `<decoder> <in> <out>`
    #[arg(long, default_value = "decode")]
    decoder: PathBuf,

    #[arg(long, default_value_t = config::DEFAULT_MAX_WIDTH)]
    max_width: u32,

    #[arg(long, default_value_t = config::DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    #[arg(long, default_value_t = config::DEFAULT_BLOCK_SIZE)]
    block_size: u32,

    #[arg(long, default_value_t = config::DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Length of every generated signal in seconds
    #[arg(long, default_value_t = config::DEFAULT_DURATION_SECONDS)]
    duration: f64,

    /// Seed for the white noise signal
    #[arg(long, default_value_t = config::DEFAULT_SEED)]
    seed: u64,

    /// Where staged inputs and scratch files go
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Where heatmaps and the report go
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Only evaluate this corpus file (repeatable), e.g. `sin100Hz.wav`
    #[arg(long = "signal")]
    signals: Vec<String>,

    /// Skip heatmap rendering, only write the report
    #[arg(long)]
    no_plots: bool,
}

impl From<RunArgs> for HarnessConfig
{
    fn from(args: RunArgs) -> Self
    {
        HarnessConfig
        {
            sample_rate: args.sample_rate,
            duration_seconds: args.duration,
            grid: ParameterGrid
            {
                max_width: args.max_width,
                max_depth: args.max_depth,
                block_size: args.block_size,
            },
            seed: args.seed,
            encoder: args.encoder,
            decoder: args.decoder,
            work_dir: args.work_dir,
            output_dir: args.output_dir,
            signal_filter: args.signals,
            render_heatmaps: !args.no_plots,
        }
    }
}

fn run_sweep(config: HarnessConfig) -> Result<()>
{
    let cells_per_signal = config.grid.num_cells();
    let (tx, rx) = unbounded();

    // The sweep stays sequential on its own thread; this one only reports
    let worker = thread::spawn(move ||
    {
        harness::run(&config, Some(&tx))
    });

    let mut cells_done = 0u64;
    for event in rx
    {
        match event
        {
            Progress::SignalStarted { signal, index, total } =>
            {
                cells_done = 0;
                println!("[{}/{}] {}", index + 1, total, signal);
            }
            Progress::CellMeasured { width, depth, time_ratio, mse_ratio, .. } =>
            {
                cells_done += 1;
                println!("  ({:>2}, {}) time {:>7.1}%  MSE {:>7.1}%  [{}/{}]",
                         width, depth, time_ratio, mse_ratio, cells_done, cells_per_signal);
            }
            Progress::HeatmapWritten(path) => println!("  wrote {}", path.display()),
            Progress::Complete(summary) => println!("{}", summary),
        }
    }

    let report = worker
        .join()
        .map_err(|_| anyhow::anyhow!("sweep thread panicked"))?
        .context("sweep aborted")?;
    log::debug!("Sweep report holds {} signals", report.signals.len());
    Ok(())
}

fn main() -> Result<()>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command
    {
        Command::Run(args) => run_sweep(args.into()),
        Command::Render { report, output_dir } =>
        {
            let saved = harness::load_report(&report)
                .with_context(|| format!("failed to load report {}", report.display()))?;
            let written = harness::render_saved(&saved, &output_dir).context("rendering failed")?;
            println!("Rendered {} heatmaps into {}", written.len(), output_dir.display());
            Ok(())
        }
    }
}
