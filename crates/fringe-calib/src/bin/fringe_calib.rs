//! fringe-calib CLI: board layouts, fringe sets and offline phase decoding.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use fringe_calib::core::{BoardGeometry, ImageSize, ObjectPoint};
use fringe_calib::images::{load_gray, phase_to_gray, save_gray};
use fringe_calib::phase::{FringeOrientation, FringeSynthesizer, PhaseDecoder, Pitch};
use fringe_calib::rig::CalibrationConfig;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "fringe-calib")]
#[command(about = "Camera/projector calibration helpers: boards, fringes and phase decoding")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the board's object points as JSON.
    Board(BoardArgs),

    /// Write one phase-shifted fringe set as PNG files.
    Fringes(FringesArgs),

    /// Decode captured fringe images into a wrapped phase map.
    Decode(DecodeArgs),

    /// Write a default calibration config.
    InitConfig {
        /// Output path; prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct BoardArgs {
    /// Read the board from a calibration config instead of the flags below.
    #[arg(long, conflicts_with_all = ["rows", "cols", "spacing"])]
    config: Option<PathBuf>,

    /// Marker rows.
    #[arg(long, default_value_t = 4)]
    rows: u32,

    /// Markers per row.
    #[arg(long, default_value_t = 11)]
    cols: u32,

    /// Marker spacing in board units.
    #[arg(long, default_value_t = 0.5)]
    spacing: f32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrientationArg {
    /// Fringes vary along columns (encode the projector column).
    Horizontal,
    /// Fringes vary along rows (encode the projector row).
    Vertical,
}

impl From<OrientationArg> for FringeOrientation {
    fn from(value: OrientationArg) -> Self {
        match value {
            OrientationArg::Horizontal => FringeOrientation::Horizontal,
            OrientationArg::Vertical => FringeOrientation::Vertical,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct FringesArgs {
    /// Pattern width in pixels.
    #[arg(long)]
    width: usize,

    /// Pattern height in pixels.
    #[arg(long)]
    height: usize,

    /// Fringe period in pixels.
    #[arg(long, default_value_t = 70.0)]
    pitch: f32,

    /// Number of phase shifts.
    #[arg(long, default_value_t = 5)]
    count: usize,

    #[arg(long, value_enum, default_value_t = OrientationArg::Horizontal)]
    orientation: OrientationArg,

    /// Directory receiving `<orientation>_p<pitch>_k<index>.png`.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct DecodeArgs {
    /// Captured fringe images in phase-shift order.
    #[arg(required = true)]
    captures: Vec<PathBuf>,

    /// Path of the rendered wrapped phase PNG.
    #[arg(long)]
    out: PathBuf,

    /// Pixels with lower modulation are rendered black and not counted as valid.
    #[arg(long, default_value_t = 2.0)]
    min_modulation: f32,
}

#[derive(Serialize)]
struct BoardDump {
    board: BoardGeometry,
    object_points: Vec<ObjectPoint>,
}

#[derive(Serialize)]
struct DecodeSummary {
    width: usize,
    height: usize,
    captures: usize,
    valid_pixels: usize,
    mean_modulation: f32,
    phase_png: PathBuf,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Board(args) => run_board(&args),
        Commands::Fringes(args) => run_fringes(&args),
        Commands::Decode(args) => run_decode(&args),
        Commands::InitConfig { out } => run_init_config(out.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let level = fringe_calib::core::level_from_verbosity(verbose);
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init_with_filter(level);
        fringe_calib::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = fringe_calib::core::init_with_level(level);
    }
}

fn run_board(args: &BoardArgs) -> CliResult<()> {
    let board = match &args.config {
        Some(path) => CalibrationConfig::load_json(path)?.board,
        None => BoardGeometry::new(args.rows, args.cols, args.spacing)?,
    };
    log::info!(
        "board: {}x{} markers, spacing {}",
        board.marker_rows(),
        board.marker_cols(),
        board.marker_spacing()
    );
    let dump = BoardDump {
        board,
        object_points: board.object_points(),
    };
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}

fn run_fringes(args: &FringesArgs) -> CliResult<()> {
    if args.width == 0 || args.height == 0 {
        return Err("pattern width and height must be positive".into());
    }
    if args.count < 3 {
        return Err(format!("phase shifting needs at least 3 fringes, got {}", args.count).into());
    }
    let pitch = Pitch::new(args.pitch)
        .ok_or_else(|| format!("pitch must be finite and positive (got {})", args.pitch))?;

    let orientation = FringeOrientation::from(args.orientation);
    let synth = FringeSynthesizer::new(args.count);
    let set = synth.generate_set(ImageSize::new(args.width, args.height), pitch, orientation);

    fs::create_dir_all(&args.out_dir)?;
    let prefix = match orientation {
        FringeOrientation::Horizontal => "horizontal",
        FringeOrientation::Vertical => "vertical",
    };
    for pattern in &set {
        let path = args.out_dir.join(format!(
            "{prefix}_p{}_k{}.png",
            args.pitch, pattern.phase_index
        ));
        save_gray(&path, &pattern.to_gray_u8())?;
        println!("{}", path.display());
    }
    log::info!("wrote {} fringe patterns", set.len());
    Ok(())
}

fn run_decode(args: &DecodeArgs) -> CliResult<()> {
    let decoder = PhaseDecoder::new(args.captures.len())?;
    let captures = args
        .captures
        .iter()
        .map(|path| {
            log::debug!("loading {}", path.display());
            load_gray(path)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let wrapped = decoder.decode(&captures)?;

    let mut masked = wrapped.phase.clone();
    let mut valid = 0usize;
    for (phase, &modulation) in masked.data.iter_mut().zip(&wrapped.modulation.data) {
        if modulation >= args.min_modulation {
            valid += 1;
        } else {
            *phase = f32::NAN;
        }
    }
    save_gray(&args.out, &phase_to_gray(&masked))?;

    let size = wrapped.size();
    let mean_modulation =
        wrapped.modulation.data.iter().sum::<f32>() / size.pixel_count() as f32;
    log::info!(
        "decoded {}x{} from {} captures, {} valid pixels",
        size.width,
        size.height,
        captures.len(),
        valid
    );

    let summary = DecodeSummary {
        width: size.width,
        height: size.height,
        captures: captures.len(),
        valid_pixels: valid,
        mean_modulation,
        phase_png: args.out.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_init_config(out: Option<&Path>) -> CliResult<()> {
    let config = CalibrationConfig::default();
    match out {
        Some(path) => {
            config.write_json(path)?;
            log::info!("wrote default config to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
