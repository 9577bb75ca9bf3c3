//! freqxform - frequency-domain raster resampling, rotation and translation

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod flat_raster;

// =============================================================================
// Logging infrastructure
// =============================================================================

/// Global logger instance for file logging.
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

/// File logger that writes messages to a log file.
struct Logger {
    file: File,
}

impl Logger {
    fn new(path: &PathBuf) -> std::io::Result<Self> {
        let file = File::options().append(true).create(true).open(path)?;
        Ok(Self { file })
    }

    fn log(&mut self, msg: &str) {
        let _ = writeln!(self.file, "{msg}");
    }
}

/// Logs a message to stderr and optionally to the log file.
pub fn log(msg: &str) {
    eprintln!("{msg}");
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(msg);
        }
    }
}

/// Returns the default log file path (next to the binary).
fn get_default_log_path() -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe() {
        let mut log_path = exe_path;
        log_path.set_extension("log");
        log_path
    } else {
        PathBuf::from("freqxform.log")
    }
}

/// Initializes tracing based on verbosity level.
fn init_tracing(verbose: u8, log_path: Option<&PathBuf>) {
    let filter = match verbose {
        0 => "warn",
        1 => "freqxform=info",
        2 => "freqxform=debug",
        _ => "freqxform=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if let Some(path) = log_path {
        let log_dir = path.parent().unwrap_or(Path::new("."));
        let log_filename = path.file_name().unwrap_or(std::ffi::OsStr::new("freqxform.log"));
        let file_appender = tracing_appender::rolling::never(log_dir, log_filename);

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .with_ansi(false)
            .with_writer(file_appender)
            .init();
    } else if verbose > 0 {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .init();
    }
}

// =============================================================================
// CLI surface
// =============================================================================

#[derive(Parser)]
#[command(name = "freqxform")]
#[command(author, version, about = "Frequency-domain raster resampling, rotation and translation")]
#[command(long_about = "
Resamples, rotates and translates single-band rasters entirely in the
frequency domain.

Examples:
  freqxform info in.bin
  freqxform resample in.bin out.bin --zoom 3:2
  freqxform rotate in.bin out.bin --angle 12.5
  freqxform translate in.bin out.bin --row-shift 0.4 --col-shift -1.25
  freqxform stream in.bin out.bin -j 4 resample --zoom 2
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write log to file (-l default, -l path.log custom)
    #[arg(short = 'l', long = "log", global = true)]
    log: Option<Option<PathBuf>>,

    /// Number of worker threads for the rayon global pool (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Report raster dimensions and geo-reference
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Resample (zoom) a raster by a rational ratio
    #[command(visible_alias = "r")]
    Resample(ResampleArgs),

    /// Rotate a raster by an arbitrary angle
    Rotate(RotateArgs),

    /// Translate a raster by a sub-pixel shift
    #[command(visible_alias = "t")]
    Translate(TranslateArgs),

    /// Run a transform block-by-block, for rasters too large to FFT whole
    #[command(visible_alias = "s")]
    Stream(StreamArgs),
}

#[derive(Args)]
pub struct InfoArgs {
    /// Input raster
    pub input: PathBuf,

    /// Show min/max/mean statistics
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args)]
pub struct ResampleArgs {
    /// Input raster
    pub input: PathBuf,
    /// Output raster
    pub output: PathBuf,

    /// Zoom ratio, "output" or "input:output" (e.g. "2" or "3:2")
    #[arg(long)]
    pub zoom: String,

    /// Filter kernel, as a flat-raster file
    #[arg(long)]
    pub filter: Option<PathBuf>,

    /// Filter hot point "x,y" (default: centered)
    #[arg(long)]
    pub hot_point: Option<String>,

    /// Normalize the filter's polyphase sub-filters before use
    #[arg(long)]
    pub normalize: bool,

    /// Image decomposition ahead of the zoom
    #[arg(long, value_enum, default_value_t = DecompositionArg::Regular)]
    pub decomposition: DecompositionArg,

    /// Upsampling strategy for an integer zoom (auto-selected if unset)
    #[arg(long, value_enum)]
    pub upsampling: Option<UpsamplingArg>,

    /// How out-of-raster margins are synthesized
    #[arg(long, value_enum, default_value_t = PaddingKindArg::Mirror)]
    pub padding: PaddingKindArg,

    /// Spatial-domain padding added on every side before zooming
    #[arg(long, default_value_t = 0)]
    pub padding_size: i32,
}

#[derive(Args)]
pub struct RotateArgs {
    /// Input raster
    pub input: PathBuf,
    /// Output raster
    pub output: PathBuf,

    /// Rotation angle in degrees
    #[arg(long)]
    pub angle: f64,
}

#[derive(Args)]
pub struct TranslateArgs {
    /// Input raster
    pub input: PathBuf,
    /// Output raster
    pub output: PathBuf,

    /// Row (vertical) shift, in pixels
    #[arg(long, default_value_t = 0.0)]
    pub row_shift: f64,

    /// Column (horizontal) shift, in pixels
    #[arg(long, default_value_t = 0.0)]
    pub col_shift: f64,
}

#[derive(Args)]
pub struct StreamArgs {
    /// Input raster
    pub input: PathBuf,
    /// Output raster
    pub output: PathBuf,

    #[command(subcommand)]
    pub op: StreamOp,

    /// Nominal block size on each side, in pixels
    #[arg(long, default_value_t = 512)]
    pub block_size: i32,

    /// Margin requested on each side of a block, in pixels
    #[arg(long, default_value_t = 16)]
    pub margin: i32,

    /// How a margin beyond the raster's true edge is synthesized
    #[arg(long, value_enum, default_value_t = PaddingKindArg::Mirror)]
    pub padding: PaddingKindArg,

    /// Worker thread count (0 or 1 runs the monothread path)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub workers: usize,

    /// Don't grow the block size to a dyadic/zoom-compliant size before streaming
    #[arg(long)]
    pub no_block_resizing: bool,
}

#[derive(Subcommand)]
pub enum StreamOp {
    /// Resample (zoom) by a rational ratio
    Resample {
        /// Zoom ratio, "output" or "input:output"
        #[arg(long)]
        zoom: String,
        /// Filter kernel, as a flat-raster file
        #[arg(long)]
        filter: Option<PathBuf>,
        /// Filter hot point "x,y" (default: centered)
        #[arg(long)]
        hot_point: Option<String>,
        /// Normalize the filter's polyphase sub-filters before use
        #[arg(long)]
        normalize: bool,
        /// Image decomposition ahead of the zoom
        #[arg(long, value_enum, default_value_t = DecompositionArg::Regular)]
        decomposition: DecompositionArg,
        /// Upsampling strategy for an integer zoom (auto-selected if unset)
        #[arg(long, value_enum)]
        upsampling: Option<UpsamplingArg>,
    },
    /// Rotate by an arbitrary angle (best-effort across block seams)
    Rotate {
        #[arg(long)]
        angle: f64,
    },
    /// Translate by a sub-pixel shift
    Translate {
        #[arg(long, default_value_t = 0.0)]
        row_shift: f64,
        #[arg(long, default_value_t = 0.0)]
        col_shift: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PaddingKindArg {
    Zero,
    Mirror,
}

impl PaddingKindArg {
    fn to_padding_kind(self) -> freqxform_core::PaddingKind {
        match self {
            PaddingKindArg::Zero => freqxform_core::PaddingKind::Zero,
            PaddingKindArg::Mirror => freqxform_core::PaddingKind::Mirror,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DecompositionArg {
    Regular,
    PeriodicSmooth,
}

impl DecompositionArg {
    fn to_decomposition(self) -> freqxform_ops::Decomposition {
        match self {
            DecompositionArg::Regular => freqxform_ops::Decomposition::Regular,
            DecompositionArg::PeriodicSmooth => freqxform_ops::Decomposition::PeriodicSmooth,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UpsamplingArg {
    ZeroPadding,
    Periodization,
}

impl UpsamplingArg {
    fn to_upsampling_strategy(self) -> freqxform_ops::UpsamplingStrategy {
        match self {
            UpsamplingArg::ZeroPadding => freqxform_ops::UpsamplingStrategy::ZeroPadding,
            UpsamplingArg::Periodization => freqxform_ops::UpsamplingStrategy::Periodization,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match &cli.log {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(get_default_log_path()),
        None => None,
    };

    init_tracing(cli.verbose, log_path.as_ref());

    if let Some(ref path) = log_path {
        if let Ok(logger) = Logger::new(path) {
            if let Ok(mut guard) = LOGGER.lock() {
                *guard = Some(logger);
            }
            if cli.verbose > 0 {
                log(&format!("Logging to: {}", path.display()));
            }
        }
    }

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Resample(args) => commands::resample::run(args, cli.verbose),
        Commands::Rotate(args) => commands::rotate::run(args, cli.verbose),
        Commands::Translate(args) => commands::translate::run(args, cli.verbose),
        Commands::Stream(args) => commands::stream::run(args, cli.verbose),
    }
}
