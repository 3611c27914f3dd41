use super::WorkflowOutput;
use crate::core::io::deposits;
use crate::core::io::output::OutputWriter;
use crate::core::models::field::DerivedField;
use crate::core::tally::EnergyTally;
use crate::engine::config::ConfigError;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::setup::Setup;
use std::path::Path;
use tracing::{info, instrument, warn};

pub const ENERGY_FIELD: &str = "edep_keV";

/// Bins step deposits (CSV) into the configured voxel grid and writes `<output>.vti`.
#[instrument(skip_all, name = "tally_workflow")]
pub fn run(
    deposits_path: &Path,
    setup: &Setup,
    simulated_events: Option<f64>,
    output: &Path,
    reporter: &ProgressReporter,
) -> Result<WorkflowOutput, EngineError> {
    if let Some(n) = simulated_events {
        if !n.is_finite() || n <= 0.0 {
            return Err(ConfigError::invalid(
                "simulated_events",
                format!("must be a finite number > 0 (got {})", n),
            )
            .into());
        }
    }
    let geometry = setup.voxel_grid.geometry()?;

    let steps = reporter.phase("Reading deposits", || {
        Ok::<_, EngineError>(deposits::read_from_path(deposits_path)?)
    })?;

    let tally = reporter.phase("Tallying", || {
        let mut tally = EnergyTally::new(geometry);
        tally.extend(&steps);
        Ok::<_, EngineError>(tally)
    })?;
    info!(
        "Tallied {} deposit(s), {:.6e} keV inside the grid",
        steps.len() - tally.ignored(),
        tally.deposited_kev()
    );
    if tally.ignored() > 0 {
        warn!("{} deposit(s) fell outside the voxel grid and were dropped.", tally.ignored());
        reporter.report(Progress::Message(format!(
            "{} deposit(s) outside the grid were dropped",
            tally.ignored()
        )));
    }

    let mut metadata = setup.material.provenance();
    if let Some(beam) = &setup.beam {
        metadata.extend(&beam.provenance());
    }
    if let Some(n) = simulated_events {
        metadata.insert_number("simulated_events", n);
    }
    metadata.insert_text("quantity_unit", "keV");
    let field = DerivedField::new(ENERGY_FIELD, tally.into_grid(), metadata);

    let mut writer = OutputWriter::new(output)?;
    let written = writer.stage_document(&field)?;
    let paths = writer.commit()?;
    Ok(WorkflowOutput {
        fields: vec![written],
        paths,
    })
}
