//! frame-bounds CLI: crop scanned film frames to their exposed area.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use frame_bounds::annotate::annotate_file;
use frame_bounds::config::load_params;
use frame_bounds::detect::{crop_file, detect_exposure_bounds};
use frame_bounds::io::{derived_path, load_gray};
use frame_bounds::{CropError, ExposureBoundsParams};

#[derive(Parser)]
#[command(name = "frame-bounds")]
#[command(about = "Detect and crop the exposed frame of scanned film negatives")]
#[command(version)]
struct Cli {
    /// Verbosity of the plain logger.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Emit `tracing` spans and events instead of plain log lines (RUST_LOG filters).
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Crop a scan to its exposed frame.
    Crop(CropArgs),

    /// Print or write the detection result as JSON.
    Detect(DetectArgs),

    /// Outline the detected frame on the full scan.
    Annotate(AnnotateArgs),
}

#[derive(Debug, Args)]
struct CropArgs {
    /// Scanned image to crop.
    #[arg(long)]
    input: PathBuf,

    /// Output path (default: `<stem>_cropped.<ext>` next to the input).
    #[arg(long, conflicts_with = "ext")]
    output: Option<PathBuf>,

    /// Extension for the default output path (default: the input's).
    #[arg(long)]
    ext: Option<String>,

    /// Write intermediate masks and every sweep level as PNG files.
    #[arg(long)]
    debug: bool,

    /// Directory for debug images (default: `<stem>_debug` next to the input).
    #[arg(long, requires = "debug")]
    debug_dir: Option<PathBuf>,

    /// JSON file with detector parameters.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DetectArgs {
    /// Scanned image to analyse.
    #[arg(long)]
    input: PathBuf,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    json: Option<PathBuf>,

    /// JSON file with detector parameters.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct AnnotateArgs {
    /// Scanned image to annotate.
    #[arg(long)]
    input: PathBuf,

    /// Output path (default: `<stem>_analyzed.jpg` next to the input).
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON file with detector parameters (default: the annotation preset).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version requests go to stdout and are not failures.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(&cli);

    let result = match &cli.command {
        Commands::Crop(args) => run_crop(args),
        Commands::Detect(args) => run_detect(args),
        Commands::Annotate(args) => run_annotate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    if init_trace_subscriber(cli) {
        return;
    }
    if let Err(err) = frame_bounds::core::init_with_level(cli.log_level.into()) {
        eprintln!("failed to install logger: {err}");
    }
}

#[cfg(feature = "tracing")]
fn init_trace_subscriber(cli: &Cli) -> bool {
    if !cli.trace {
        return false;
    }
    if let Err(err) = tracing_log::LogTracer::init() {
        eprintln!("failed to bridge log records into tracing: {err}");
    }
    frame_bounds::core::init_tracing(false);
    true
}

#[cfg(not(feature = "tracing"))]
fn init_trace_subscriber(_cli: &Cli) -> bool {
    false
}

fn params_or(
    config: Option<&Path>,
    fallback: ExposureBoundsParams,
) -> Result<ExposureBoundsParams, CropError> {
    match config {
        Some(path) => load_params(path),
        None => Ok(fallback),
    }
}

fn run_crop(args: &CropArgs) -> Result<(), CropError> {
    let mut params = params_or(args.config.as_deref(), ExposureBoundsParams::default())?;
    params.debug |= args.debug;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| derived_path(&args.input, "_cropped", args.ext.as_deref()));
    let debug_dir = params.debug.then(|| {
        args.debug_dir
            .clone()
            .unwrap_or_else(|| derived_path(&args.input, "_debug", Some("")))
    });

    crop_file(&args.input, &output, &params, debug_dir.as_deref())?;
    Ok(())
}

fn run_detect(args: &DetectArgs) -> Result<(), CropError> {
    let params = params_or(args.config.as_deref(), ExposureBoundsParams::default())?;
    let gray = load_gray(&args.input)?;
    let result = detect_exposure_bounds(&gray, &params)?;

    let json = serde_json::to_string_pretty(&result).map_err(|err| CropError::ReportWrite {
        path: args.json.clone().unwrap_or_else(|| PathBuf::from("-")),
        source: err.into(),
    })?;
    match &args.json {
        Some(path) => {
            fs::write(path, json).map_err(|source| CropError::ReportWrite {
                path: path.clone(),
                source,
            })?;
            log::info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_annotate(args: &AnnotateArgs) -> Result<(), CropError> {
    let params = params_or(
        args.config.as_deref(),
        ExposureBoundsParams::for_annotation(),
    )?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| derived_path(&args.input, "_analyzed", Some("jpg")));
    annotate_file(&args.input, &output, &params)?;
    Ok(())
}
