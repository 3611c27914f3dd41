use super::{WorkflowOutput, read_grid, write_fields};
use crate::core::models::field::{DerivedField, FieldMetadata};
use crate::engine::config::GValueTable;
use crate::engine::dose::DoseEngine;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::radiolysis::{RadiolysisEngine, RadiolysisYields, SpeciesYield};
use crate::engine::setup::Setup;
use std::path::Path;
use tracing::{info, instrument};

/// What the input grid of the configured radiolysis path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadiolysisInput {
    /// Energy deposited per voxel, keV.
    #[default]
    Energy,
    /// Absorbed dose, Gy; converted back to energy through the voxel mass.
    Dose,
}

/// Radiolysis with the material's own G-value table.
///
/// Fails with a configuration error when the table is absent.
#[instrument(skip_all, name = "radiolysis_workflow")]
pub fn run_configured(
    input: &Path,
    input_kind: RadiolysisInput,
    setup: &Setup,
    output_prefix: &Path,
    reporter: &ProgressReporter,
) -> Result<WorkflowOutput, EngineError> {
    let beam = setup.require_beam()?;
    let g_values = setup.material.require_g_values()?;
    let engine = RadiolysisEngine::new(g_values);

    let grid = read_grid(input, reporter)?;
    let yields = reporter.phase("Computing radiolysis", || {
        info!(
            "Radiolysis from {:?} input, G-values {}",
            input_kind,
            g_values.describe()
        );
        let yields = match input_kind {
            RadiolysisInput::Energy => engine.compute(&grid, 1.0, beam.exposure_time_s),
            RadiolysisInput::Dose => engine.compute_from_dose(
                &grid,
                &DoseEngine::for_material(&setup.material),
                beam.exposure_time_s,
            ),
        };
        Ok::<_, EngineError>(yields)
    })?;

    let mut provenance = setup.material.provenance();
    provenance.extend(&beam.provenance());
    if let Some(source) = setup.material.radiolysis_source() {
        provenance.insert_text("radiolysis_source", source);
    }
    write_fields(
        output_prefix,
        &species_fields(yields, g_values, &provenance),
        reporter,
    )
}

/// Event-scaled radiolysis with the built-in bulk-water G-values.
#[instrument(skip_all, name = "water_radiolysis_workflow", fields(simulated_events = simulated_events))]
pub fn run_bulk_water(
    input: &Path,
    simulated_events: f64,
    setup: &Setup,
    output_prefix: &Path,
    reporter: &ProgressReporter,
) -> Result<WorkflowOutput, EngineError> {
    let beam = setup.require_beam()?;
    let event_scale = beam.event_scale(simulated_events)?;
    let g_values = GValueTable::bulk_water();
    let engine = RadiolysisEngine::new(&g_values);

    let energy = read_grid(input, reporter)?;
    let yields = reporter.phase("Computing radiolysis", || {
        info!(
            "Bulk-water radiolysis, event scale {:.6e}, exposure {} s",
            event_scale, beam.exposure_time_s
        );
        Ok::<_, EngineError>(engine.compute(&energy, event_scale, beam.exposure_time_s))
    })?;

    let mut provenance = setup.material.provenance();
    provenance.extend(&beam.provenance());
    provenance.insert_number("simulated_events", simulated_events);
    provenance.insert_number("event_scale", event_scale);
    write_fields(
        output_prefix,
        &species_fields(yields, &g_values, &provenance),
        reporter,
    )
}

fn species_fields(
    yields: RadiolysisYields,
    g_values: &GValueTable,
    provenance: &FieldMetadata,
) -> Vec<DerivedField> {
    let described = g_values.describe();
    let mut fields = Vec::with_capacity(2 * yields.len());
    for species in yields {
        let concentration_name = species.concentration_field_name();
        let rate_name = species.rate_field_name();
        let SpeciesYield {
            species: name,
            concentration_m,
            rate_m_per_s,
            ..
        } = species;
        let metadata = provenance
            .clone()
            .with_text("g_values_molecules_per_100eV", described.clone())
            .with_text("species", name);
        fields.push(DerivedField::new(
            concentration_name,
            concentration_m,
            metadata.clone().with_text("quantity_unit", "M"),
        ));
        fields.push(DerivedField::new(
            rate_name,
            rate_m_per_s,
            metadata.with_text("quantity_unit", "M/s"),
        ));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::traits::GridFile;
    use crate::core::io::vti::VtiFile;
    use crate::engine::config::ConfigError;
    use crate::workflows::test_support::{energy_grid, rel_approx_equal, setup, write_grid};
    use tempfile::tempdir;

    #[test]
    fn configured_table_writes_concentration_and_rate_per_species() {
        let dir = tempdir().unwrap();
        let input = write_grid(dir.path(), "edep.vti", &energy_grid());
        let prefix = dir.path().join("radiolysis");

        let output = run_configured(
            &input,
            RadiolysisInput::Energy,
            &setup(),
            &prefix,
            &ProgressReporter::new(),
        )
        .unwrap();
        let names: Vec<_> = output.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["OH_M", "OH_rate_Mps", "H2O2_M", "H2O2_rate_Mps"]);
        assert_eq!(output.paths.len(), 8);

        let (oh, meta) = VtiFile::read_from_path(dir.path().join("radiolysis_OH_M.vti")).unwrap();
        let (rate, _) =
            VtiFile::read_from_path(dir.path().join("radiolysis_OH_rate_Mps.vti")).unwrap();
        let expected = (1000.0 / 100.0 * 2.8) / 6.02214076e23 / (8e-9 * 1000.0);
        assert!(rel_approx_equal(oh.values()[0], expected, 1e-6));
        assert!(rel_approx_equal(rate.values()[0], expected / 2.0, 1e-6));

        assert_eq!(meta.field_data.get("species"), Some("OH"));
        assert_eq!(meta.field_data.get("radiolysis_source"), Some("test"));
        assert_eq!(
            meta.field_data.get("g_values_molecules_per_100eV"),
            Some("OH:2.8;H2O2:0.7")
        );
    }

    #[test]
    fn dose_input_matches_energy_input() {
        let dir = tempdir().unwrap();
        let energy = energy_grid();
        let dose = DoseEngine::new(1.0).compute_physical(&energy);
        let energy_path = write_grid(dir.path(), "edep.vti", &energy);
        let dose_path = write_grid(dir.path(), "dose.vti", &dose);
        let reporter = ProgressReporter::new();

        let a = run_configured(
            &energy_path,
            RadiolysisInput::Energy,
            &setup(),
            &dir.path().join("a"),
            &reporter,
        )
        .unwrap();
        let b = run_configured(
            &dose_path,
            RadiolysisInput::Dose,
            &setup(),
            &dir.path().join("b"),
            &reporter,
        )
        .unwrap();
        for (x, y) in a.fields.iter().zip(&b.fields) {
            assert_eq!(x.name, y.name);
            assert!(rel_approx_equal(x.stats.mean, y.stats.mean, 1e-6));
        }
    }

    #[test]
    fn configured_path_without_g_values_fails() {
        let dir = tempdir().unwrap();
        let input = write_grid(dir.path(), "edep.vti", &energy_grid());
        let mut setup = setup();
        setup.material.radiolysis = None;
        let err = run_configured(
            &input,
            RadiolysisInput::Energy,
            &setup,
            &dir.path().join("radiolysis"),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                source: ConfigError::MissingKey(_)
            }
        ));
    }

    #[test]
    fn bulk_water_path_uses_the_five_default_species() {
        let dir = tempdir().unwrap();
        let input = write_grid(dir.path(), "edep.vti", &energy_grid());
        let mut setup = setup();
        setup.material.radiolysis = None;

        let output = run_bulk_water(
            &input,
            2e10,
            &setup,
            &dir.path().join("water"),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(output.fields.len(), 10);
        assert!(dir.path().join("water_e_aq_M.vti").is_file());

        let (h2, meta) = VtiFile::read_from_path(dir.path().join("water_H2_M.vti")).unwrap();
        let expected = (4.0 * 1000.0 / 100.0 * 0.45) / 6.02214076e23 / (8e-9 * 1000.0);
        assert!(rel_approx_equal(h2.values()[3], expected, 1e-6));
        assert_eq!(meta.field_data.get("event_scale"), Some("1"));
        assert_eq!(
            meta.field_data.get("g_values_molecules_per_100eV"),
            Some("OH:2.8;e_aq:2.7;H:0.6;H2:0.45;H2O2:0.7")
        );
    }
}
