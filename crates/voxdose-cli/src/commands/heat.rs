use super::{print_summary, reporter};
use crate::cli::{HeatArgs, TemperatureArgs};
use crate::config::builder::{CommandPaths, build_config};
use crate::config::defaults::{OutputKind, SetupLocation};
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;
use voxdose::workflows;
use voxdose::workflows::heat::TemperatureUnit;

fn unit(celsius: bool) -> TemperatureUnit {
    if celsius {
        TemperatureUnit::Celsius
    } else {
        TemperatureUnit::Kelvin
    }
}

pub fn run(args: HeatArgs, search_dirs: &[PathBuf]) -> Result<()> {
    let config = build_config(
        CommandPaths {
            input: &args.input,
            setup: args.setup.as_deref(),
            output_prefix: args.output_prefix.as_deref(),
            setup_location: SetupLocation::Simulation,
            output_kind: OutputKind::Thermal,
        },
        search_dirs,
    )?;
    info!(
        "Heat from {:?} ({} simulated events)",
        config.input_path, args.n_events
    );

    let output = workflows::heat::run(
        &config.input_path,
        args.n_events,
        &config.setup,
        &config.output_prefix,
        unit(args.celsius),
        &reporter(),
    )?;

    if let Some(beam) = &config.setup.beam {
        println!(
            "Assumed n_events={}, flux={:.3e} ph/s, exposure={} s",
            args.n_events, beam.photon_flux_per_s, beam.exposure_time_s
        );
    }
    print_summary("Heat", &output);
    Ok(())
}

pub fn run_temperature(args: TemperatureArgs, search_dirs: &[PathBuf]) -> Result<()> {
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
    info!("Temperature rise from dose grid {:?}", config.input_path);

    let output = workflows::heat::run_from_dose(
        &config.input_path,
        &config.setup,
        &config.output_prefix,
        unit(args.celsius),
        &reporter(),
    )?;
    print_summary("Temperature", &output);
    Ok(())
}
