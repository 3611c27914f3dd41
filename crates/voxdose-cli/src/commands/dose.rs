use super::{print_summary, reporter};
use crate::cli::DoseArgs;
use crate::config::builder::{CommandPaths, build_config};
use crate::config::defaults::{OutputKind, SetupLocation};
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;
use voxdose::workflows;

pub fn run(args: DoseArgs, search_dirs: &[PathBuf]) -> Result<()> {
    let config = build_config(
        CommandPaths {
            input: &args.input,
            setup: args.setup.as_deref(),
            output_prefix: args.output_prefix.as_deref(),
            setup_location: SetupLocation::Project,
            output_kind: OutputKind::Thermal,
        },
        search_dirs,
    )?;
    info!(
        "Dose from {:?} with setup {:?}",
        config.input_path, config.setup_path
    );

    let output = workflows::dose::run(
        &config.input_path,
        &config.setup,
        &config.output_prefix,
        &reporter(),
    )?;

    println!(
        "rho                    : {:.3e} g/cm3",
        config.setup.material.density_g_cm3
    );
    print_summary("Dose", &output);
    Ok(())
}
