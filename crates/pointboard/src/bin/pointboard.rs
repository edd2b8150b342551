//! pointboard CLI: detect a pointer light in images and map it onto a board.

use clap::{ArgAction, Args, Parser, Subcommand};
use pointboard::detect::{analyze_image, ImageSequenceSource};
use pointboard::{
    CalibrationFile, CaptureOutcome, Cell, DetectedPoint, GridLayout, Located,
    SessionState, TrackerConfig, TrackingLoop,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "pointboard")]
#[command(about = "Track a laser or LED pointer on a calibrated communication board")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the pointer light in a single image.
    Analyze {
        /// Path to the input image.
        image: PathBuf,

        /// Tracker configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Calibrate from four corner images, then track through a frame sequence.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Corner images in capture order: top-left, top-right, bottom-left, bottom-right.
    #[arg(
        long,
        num_args = 4,
        value_names = ["TL", "TR", "BL", "BR"],
        conflicts_with = "calibration",
        required_unless_present = "calibration"
    )]
    corners: Vec<PathBuf>,

    /// Previously saved calibration (JSON) instead of corner images.
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Tracker configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the calibration to this file once it is complete.
    #[arg(long)]
    save_calibration: Option<PathBuf>,

    /// Frames to track after calibration.
    frames: Vec<PathBuf>,
}

/// One line of `run` output.
#[derive(Serialize)]
struct FrameReport<'a> {
    frame: &'a Path,
    point: Option<DetectedPoint>,
    state: SessionState,
    location: Option<Located>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cell: Option<Cell>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Analyze { image, config } => run_analyze(&image, config.as_deref()),
        Commands::Run(args) => run_track(&args),
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) -> CliResult<()> {
    use log::LevelFilter;

    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pointboard::core::init_with_level(level).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) -> CliResult<()> {
    pointboard::core::init_tracing(false);
    Ok(())
}

fn load_config(path: Option<&Path>) -> CliResult<TrackerConfig> {
    match path {
        Some(path) => {
            log::info!("loading config {}", path.display());
            Ok(TrackerConfig::load_json(path)?)
        }
        None => Ok(TrackerConfig::default()),
    }
}

fn run_analyze(image: &Path, config: Option<&Path>) -> CliResult<()> {
    let cfg = load_config(config)?;
    let img = ::image::open(image).map_err(|e| format!("{}: {e}", image.display()))?;
    log::info!("image size: {}x{}", img.width(), img.height());

    let point = analyze_image(&img, &cfg.detector);
    println!("{}", serde_json::to_string(&point)?);
    Ok(())
}

fn run_track(args: &RunArgs) -> CliResult<()> {
    let cfg = load_config(args.config.as_deref())?;
    let mut tracker = TrackingLoop::new(&cfg);

    if let Some(path) = &args.calibration {
        let saved = CalibrationFile::load_json(path)?;
        let state = tracker.restore_calibration(saved.corners)?;
        log::info!("restored calibration from {} ({state:?})", path.display());
    } else {
        tracker.start(ImageSequenceSource::new(&args.corners));
        for path in &args.corners {
            tracker.tick()?;
            match tracker.capture_corner()? {
                CaptureOutcome::Captured { corner, .. } => {
                    log::info!("{corner} corner from {}", path.display());
                }
                CaptureOutcome::NothingToCapture => {
                    return Err(format!("no pointer light found in {}", path.display()).into());
                }
            }
        }
        tracker.stop();
    }

    if !tracker.session().is_ready() {
        return Err("calibration is incomplete".into());
    }
    if let Some(path) = &args.save_calibration {
        CalibrationFile::new(tracker.session().calibration().clone()).write_json(path)?;
        log::info!("calibration written to {}", path.display());
    }

    tracker.start(ImageSequenceSource::new(&args.frames));
    for frame in &args.frames {
        let tick = tracker.tick()?;
        let report = FrameReport {
            frame,
            point: tick.point,
            state: tick.state,
            location: tick.location,
            cell: cell_for(cfg.layout.as_ref(), tick.location.as_ref()),
        };
        println!("{}", serde_json::to_string(&report)?);
    }
    tracker.stop();
    Ok(())
}

fn cell_for(layout: Option<&GridLayout>, location: Option<&Located>) -> Option<Cell> {
    layout?.nearest_cell(location?.on_board()?)
}
