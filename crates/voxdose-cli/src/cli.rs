use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "VoxDose Developers",
    version,
    about = "VoxDose CLI - Converts voxel grids of deposited energy into absorbed dose, temperature rise and radiolytic yields.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Directory searched for input files that do not exist at the given path.
    /// May be repeated; directories are tried in order.
    #[arg(long = "search-dir", global = true, value_name = "DIR", default_value = "output")]
    pub search_dirs: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Absorbed dose from an energy grid that already represents the physical photon fluence.
    Dose(DoseArgs),
    /// Event-scaled dose and temperature rise from a Monte-Carlo energy grid.
    Heat(HeatArgs),
    /// Temperature rise from an existing dose grid.
    Temperature(TemperatureArgs),
    /// Radiolytic species from the G-values configured for the material.
    Radiolysis(RadiolysisArgs),
    /// Event-scaled radiolytic species using the built-in bulk-water G-values.
    RadiolysisWater(WaterRadiolysisArgs),
    /// Bin step-level energy deposits (CSV) into a voxel grid document.
    Tally(TallyArgs),
}

/// Arguments for the `dose` subcommand.
#[derive(Args, Debug)]
pub struct DoseArgs {
    /// Energy-deposition grid (keV per voxel).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Setup record [default: setups/setup.json]
    #[arg(value_name = "SETUP")]
    pub setup: Option<PathBuf>,

    /// Output path prefix; its directory must exist [default: output/temp]
    #[arg(value_name = "PREFIX")]
    pub output_prefix: Option<PathBuf>,
}

/// Arguments for the `heat` subcommand.
#[derive(Args, Debug)]
pub struct HeatArgs {
    /// Energy-deposition grid (keV per voxel) from the Monte-Carlo run.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Number of primaries simulated to produce INPUT.
    #[arg(value_name = "N_EVENTS")]
    pub n_events: f64,

    /// Setup record [default: setup.json]
    #[arg(value_name = "SETUP")]
    pub setup: Option<PathBuf>,

    /// Output path prefix; its directory must exist [default: output/temp]
    #[arg(value_name = "PREFIX")]
    pub output_prefix: Option<PathBuf>,

    /// Name the temperature field deltaT_C instead of deltaT_K.
    #[arg(long)]
    pub celsius: bool,
}

/// Arguments for the `temperature` subcommand.
#[derive(Args, Debug)]
pub struct TemperatureArgs {
    /// Dose grid (Gy per voxel).
    #[arg(value_name = "DOSE")]
    pub input: PathBuf,

    /// Setup record [default: setups/setup.json]
    #[arg(value_name = "SETUP")]
    pub setup: Option<PathBuf>,

    /// Output path prefix; its directory must exist [default: output/temp]
    #[arg(value_name = "PREFIX")]
    pub output_prefix: Option<PathBuf>,

    /// Name the temperature field deltaT_C instead of deltaT_K.
    #[arg(long)]
    pub celsius: bool,
}

/// Arguments for the `radiolysis` subcommand.
#[derive(Args, Debug)]
pub struct RadiolysisArgs {
    /// Energy-deposition grid (keV per voxel), or a dose grid with --from-dose.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Setup record [default: setups/setup.json]
    #[arg(value_name = "SETUP")]
    pub setup: Option<PathBuf>,

    /// Output path prefix; its directory must exist [default: output/radiolysis]
    #[arg(value_name = "PREFIX")]
    pub output_prefix: Option<PathBuf>,

    /// INPUT holds absorbed dose (Gy) rather than deposited energy.
    #[arg(long)]
    pub from_dose: bool,
}

/// Arguments for the `radiolysis-water` subcommand.
#[derive(Args, Debug)]
pub struct WaterRadiolysisArgs {
    /// Energy-deposition grid (keV per voxel) from the Monte-Carlo run.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Number of primaries simulated to produce INPUT.
    #[arg(value_name = "N_EVENTS")]
    pub n_events: f64,

    /// Setup record [default: setup.json]
    #[arg(value_name = "SETUP")]
    pub setup: Option<PathBuf>,

    /// Output path prefix; its directory must exist [default: output/radiolysis]
    #[arg(value_name = "PREFIX")]
    pub output_prefix: Option<PathBuf>,
}

/// Arguments for the `tally` subcommand.
#[derive(Args, Debug)]
pub struct TallyArgs {
    /// CSV of step deposits with columns x_mm, y_mm, z_mm, edep_keV.
    #[arg(value_name = "DEPOSITS")]
    pub deposits: PathBuf,

    /// Setup record [default: setups/setup.json]
    #[arg(value_name = "SETUP")]
    pub setup: Option<PathBuf>,

    /// Output path without extension; its directory must exist [default: output/dose]
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Number of simulated primaries, recorded in the output metadata.
    #[arg(long, value_name = "N")]
    pub events: Option<f64>,
}
