use super::dose::DOSE_FIELD;
use super::{WorkflowOutput, read_grid, write_fields};
use crate::core::models::field::{DerivedField, FieldMetadata};
use crate::engine::dose::DoseEngine;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::setup::Setup;
use crate::engine::temperature::TemperatureEngine;
use std::path::Path;
use tracing::{info, instrument};

/// Label of the temperature-rise field. A rise of 1 K equals a rise of 1 °C, so only the
/// name and unit label differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Kelvin,
    Celsius,
}

impl TemperatureUnit {
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Kelvin => "deltaT_K",
            Self::Celsius => "deltaT_C",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kelvin => "K",
            Self::Celsius => "C",
        }
    }
}

/// Event-scaled dose and temperature rise from a Monte-Carlo energy grid of
/// `simulated_events` primaries.
#[instrument(skip_all, name = "heat_workflow", fields(simulated_events = simulated_events))]
pub fn run(
    input: &Path,
    simulated_events: f64,
    setup: &Setup,
    output_prefix: &Path,
    unit: TemperatureUnit,
    reporter: &ProgressReporter,
) -> Result<WorkflowOutput, EngineError> {
    let beam = setup.require_beam()?;
    let event_scale = beam.event_scale(simulated_events)?;
    let temperature = TemperatureEngine::for_material(&setup.material)?;
    let dose_engine = DoseEngine::for_material(&setup.material);

    let energy = read_grid(input, reporter)?;

    let (dose, delta_t) = reporter.phase("Computing dose and temperature", || {
        info!(
            "Scaling {} simulated events to {:.3e} photons (scale {:.6e})",
            simulated_events,
            beam.photons(),
            event_scale
        );
        Ok::<_, EngineError>(temperature.compute_from_energy(&energy, &dose_engine, event_scale))
    })?;

    let mut provenance = setup.material.provenance();
    provenance.extend(&beam.provenance());
    provenance.insert_number("simulated_events", simulated_events);
    provenance.insert_number("event_scale", event_scale);
    provenance.insert_number("voxel_cp_J_kgK", temperature.heat_capacity_j_kgk());

    let fields = [
        DerivedField::new(DOSE_FIELD, dose, with_unit(&provenance, "Gy")),
        DerivedField::new(
            unit.field_name(),
            delta_t,
            with_unit(&provenance, unit.symbol()),
        ),
    ];
    write_fields(output_prefix, &fields, reporter)
}

/// Temperature rise from an already computed dose grid (Gy).
#[instrument(skip_all, name = "temperature_workflow")]
pub fn run_from_dose(
    dose_input: &Path,
    setup: &Setup,
    output_prefix: &Path,
    unit: TemperatureUnit,
    reporter: &ProgressReporter,
) -> Result<WorkflowOutput, EngineError> {
    let temperature = TemperatureEngine::for_material(&setup.material)?;

    let dose = read_grid(dose_input, reporter)?;
    let delta_t = reporter.phase("Computing temperature", || {
        Ok::<_, EngineError>(temperature.compute(&dose))
    })?;

    let mut provenance = setup.material.provenance();
    if let Some(beam) = &setup.beam {
        provenance.extend(&beam.provenance());
    }
    provenance.insert_number("voxel_cp_J_kgK", temperature.heat_capacity_j_kgk());
    provenance.insert_text("quantity_unit", unit.symbol());

    write_fields(
        output_prefix,
        &[DerivedField::new(unit.field_name(), delta_t, provenance)],
        reporter,
    )
}

fn with_unit(provenance: &FieldMetadata, unit: &str) -> FieldMetadata {
    provenance.clone().with_text("quantity_unit", unit)
}
