use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "memtop",
    about = "Lipid membrane and leaflet identification",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Identify aggregates, membranes and leaflets in a JSON frame
    #[command(visible_alias = "id")]
    Identify(IdentifyArgs),

    /// Print the default identification settings as TOML
    Defaults,
}

/// I/O options.
#[derive(Args)]
pub struct IoOptions {
    /// Input frame (JSON, stdin if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output report (JSON, stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress banner, progress and tables (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Identification settings; flags override the configuration file.
#[derive(Args)]
#[command(next_help_heading = "Identification")]
pub struct IdentifyOptions {
    /// TOML file with identification settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Neighbor cutoff distance
    #[arg(long, value_name = "R")]
    pub cutoff: Option<f64>,

    /// Largest relative RMS plane deviation of a planar leaflet
    #[arg(long = "planarity-threshold", value_name = "T")]
    pub planarity_threshold: Option<f64>,

    /// Pair apposed single-leaflet aggregates into membranes
    #[arg(long = "pair-monolayers")]
    pub pair_monolayers: bool,

    /// Search distance for monolayer pairing (default: twice the cutoff)
    #[arg(long = "pairing-cutoff", value_name = "R")]
    pub pairing_cutoff: Option<f64>,
}

#[derive(Args)]
pub struct IdentifyArgs {
    #[command(flatten)]
    pub io: IoOptions,

    #[command(flatten)]
    pub options: IdentifyOptions,
}

pub fn parse() -> Cli {
    Cli::parse()
}
