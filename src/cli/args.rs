use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Command-line arguments of the calnotes application
#[derive(Parser)]
#[clap(
    name = "calnotes",
    version,
    about = "Calendar notes kept in a local directory"
)]
pub struct Cli {
    /// Path to the settings file (defaults to the per-user config location)
    #[clap(short = 's', long, value_parser)]
    pub settings: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the calnotes application
    #[clap(subcommand)]
    pub command: Commands,
}
