use super::{WorkflowOutput, read_grid, write_fields};
use crate::core::models::field::DerivedField;
use crate::engine::dose::DoseEngine;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::setup::Setup;
use std::path::Path;
use tracing::{info, instrument};

pub const DOSE_FIELD: &str = "dose_Gy";

/// Dose for an energy grid that already represents the physical photon fluence.
///
/// No event scaling is applied; see [`crate::workflows::heat::run`] for grids produced
/// with a reduced number of primaries.
#[instrument(skip_all, name = "dose_workflow")]
pub fn run(
    input: &Path,
    setup: &Setup,
    output_prefix: &Path,
    reporter: &ProgressReporter,
) -> Result<WorkflowOutput, EngineError> {
    let energy = read_grid(input, reporter)?;

    let dose = reporter.phase("Computing dose", || -> Result<_, EngineError> {
        let engine = DoseEngine::for_material(&setup.material);
        info!(
            "Dose for {} at {} g/cm3",
            setup.material.formula, setup.material.density_g_cm3
        );
        Ok(engine.compute_physical(&energy))
    })?;

    let metadata = setup
        .material
        .provenance()
        .with_text("quantity_unit", "Gy");
    write_fields(
        output_prefix,
        &[DerivedField::new(DOSE_FIELD, dose, metadata)],
        reporter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::traits::GridFile;
    use crate::core::io::vti::VtiFile;
    use crate::workflows::test_support::{energy_grid, rel_approx_equal, setup, write_grid};
    use tempfile::tempdir;

    #[test]
    fn writes_closed_form_dose_with_material_metadata() {
        let dir = tempdir().unwrap();
        let input = write_grid(dir.path(), "edep.vti", &energy_grid());
        let prefix = dir.path().join("temp");

        let output = run(&input, &setup(), &prefix, &ProgressReporter::new()).unwrap();
        assert_eq!(output.paths.len(), 2);
        assert!(dir.path().join("temp_dose_Gy.npy").is_file());

        let (dose, meta) = VtiFile::read_from_path(dir.path().join("temp_dose_Gy.vti")).unwrap();
        assert_eq!(dose.dims(), [2, 2, 1]);
        for (d, e) in dose.values().iter().zip([1.0, 2.0, 3.0, 4.0]) {
            let expected = e * 1000.0 * 1.602176634e-19 / 8e-6;
            assert!(rel_approx_equal(*d, expected, 1e-6));
        }
        assert_eq!(meta.array_name.as_deref(), Some("dose_Gy"));
        assert_eq!(meta.field_data.get("material_formula"), Some("H2O"));
        assert_eq!(meta.field_data.get("material_density_g_cm3"), Some("1"));
    }

    #[test]
    fn missing_input_is_a_read_error_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let err = run(
            &dir.path().join("absent.vti"),
            &setup(),
            &dir.path().join("temp"),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::GridRead { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_output_directory_is_not_created() {
        let dir = tempdir().unwrap();
        let input = write_grid(dir.path(), "edep.vti", &energy_grid());
        let err = run(
            &input,
            &setup(),
            &dir.path().join("nowhere").join("temp"),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Output { .. }));
        assert!(!dir.path().join("nowhere").exists());
    }
}
