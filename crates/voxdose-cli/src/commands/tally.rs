use super::{print_summary, reporter};
use crate::cli::TallyArgs;
use crate::config::builder::{CommandPaths, build_config};
use crate::config::defaults::{OutputKind, SetupLocation};
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;
use voxdose::workflows;

pub fn run(args: TallyArgs, search_dirs: &[PathBuf]) -> Result<()> {
    let config = build_config(
        CommandPaths {
            input: &args.deposits,
            setup: args.setup.as_deref(),
            output_prefix: args.output.as_deref(),
            setup_location: SetupLocation::Project,
            output_kind: OutputKind::Tally,
        },
        search_dirs,
    )?;
    let grid = &config.setup.voxel_grid;
    info!(
        "Tallying {:?} into {:?} cells of +/-{} mm",
        config.input_path, grid.counts, grid.half_size_mm
    );

    let output = workflows::tally::run(
        &config.input_path,
        &config.setup,
        args.events,
        &config.output_prefix,
        &reporter(),
    )?;
    print_summary("Tally", &output);
    Ok(())
}
