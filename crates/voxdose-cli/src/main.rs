mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run_app(cli) {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app(cli: Cli) -> Result<()> {
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook
        .install()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install error hooks: {}", e)))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("VoxDose CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let search_dirs = cli.search_dirs;
    let result = match cli.command {
        Commands::Dose(args) => {
            info!("Dispatching to 'dose' command.");
            commands::dose::run(args, &search_dirs)
        }
        Commands::Heat(args) => {
            info!("Dispatching to 'heat' command.");
            commands::heat::run(args, &search_dirs)
        }
        Commands::Temperature(args) => {
            info!("Dispatching to 'temperature' command.");
            commands::heat::run_temperature(args, &search_dirs)
        }
        Commands::Radiolysis(args) => {
            info!("Dispatching to 'radiolysis' command.");
            commands::radiolysis::run(args, &search_dirs)
        }
        Commands::RadiolysisWater(args) => {
            info!("Dispatching to 'radiolysis-water' command.");
            commands::radiolysis::run_water(args, &search_dirs)
        }
        Commands::Tally(args) => {
            info!("Dispatching to 'tally' command.");
            commands::tally::run(args, &search_dirs)
        }
    };

    match &result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}
