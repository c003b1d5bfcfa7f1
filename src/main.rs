use std::process::ExitCode;

use calnotes::{App, CalError, Cli, ConfigStore, NoteRepository, Result};
use clap::Parser;
use log::debug;

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.settings {
        Some(path) => ConfigStore::open(path),
        None => ConfigStore::from_platform()?,
    };
    debug!("Using settings file {}", config.settings_path().display());

    let app = App::new(NoteRepository::new(config), cli.verbose);
    app.run(cli.command)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            match e {
                CalError::NoStorageConfigured => {
                    eprintln!("Run `calnotes setup <DIR>` to choose where notes are kept.")
                }
                CalError::StorageDirectoryMissing { .. } => {
                    eprintln!("Run `calnotes setup <DIR>` to choose a new storage directory.")
                }
                _ => {}
            }
            ExitCode::FAILURE
        }
    }
}
