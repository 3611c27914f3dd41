use super::{print_summary, reporter};
use crate::cli::{RadiolysisArgs, WaterRadiolysisArgs};
use crate::config::builder::{CommandPaths, build_config};
use crate::config::defaults::{OutputKind, SetupLocation};
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;
use voxdose::workflows;
use voxdose::workflows::radiolysis::RadiolysisInput;

pub fn run(args: RadiolysisArgs, search_dirs: &[PathBuf]) -> Result<()> {
    let config = build_config(
        CommandPaths {
            input: &args.input,
            setup: args.setup.as_deref(),
            output_prefix: args.output_prefix.as_deref(),
            setup_location: SetupLocation::Project,
            output_kind: OutputKind::Radiolysis,
        },
        search_dirs,
    )?;
    let input_kind = if args.from_dose {
        RadiolysisInput::Dose
    } else {
        RadiolysisInput::Energy
    };
    info!("Radiolysis from {:?} ({:?})", config.input_path, input_kind);

    let output = workflows::radiolysis::run_configured(
        &config.input_path,
        input_kind,
        &config.setup,
        &config.output_prefix,
        &reporter(),
    )?;
    print_summary("Radiolysis", &output);
    Ok(())
}

pub fn run_water(args: WaterRadiolysisArgs, search_dirs: &[PathBuf]) -> Result<()> {
    let config = build_config(
        CommandPaths {
            input: &args.input,
            setup: args.setup.as_deref(),
            output_prefix: args.output_prefix.as_deref(),
            setup_location: SetupLocation::Simulation,
            output_kind: OutputKind::Radiolysis,
        },
        search_dirs,
    )?;
    info!(
        "Bulk-water radiolysis from {:?} ({} simulated events)",
        config.input_path, args.n_events
    );

    let output = workflows::radiolysis::run_bulk_water(
        &config.input_path,
        args.n_events,
        &config.setup,
        &config.output_prefix,
        &reporter(),
    )?;
    print_summary("Radiolysis (bulk water)", &output);
    Ok(())
}
