use super::config::MaterialSpec;
use crate::core::models::grid::VoxelGrid;
use crate::core::units::{joules_to_kev, kev_to_joules, voxel_mass_kg};
use nalgebra::Vector3;
use tracing::{debug, warn};

/// Absorbed dose (Gy) of `energy_kev` deposited into `mass_kg`, after rescaling by `event_scale`.
#[inline]
pub fn dose_gy(energy_kev: f64, event_scale: f64, mass_kg: f64) -> f64 {
    kev_to_joules(energy_kev * event_scale) / mass_kg
}

/// Converts energy-deposition grids (keV) into absorbed dose (Gy) for one uniform material.
///
/// The voxel mass is shared by every cell. A zero or negative density is not rejected here:
/// it produces non-finite or negative doses, which the caller can detect in the output stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoseEngine {
    density_g_cm3: f64,
}

impl DoseEngine {
    pub fn new(density_g_cm3: f64) -> Self {
        Self { density_g_cm3 }
    }

    pub fn for_material(material: &MaterialSpec) -> Self {
        Self::new(material.density_g_cm3)
    }

    pub fn density_g_cm3(&self) -> f64 {
        self.density_g_cm3
    }

    pub fn voxel_mass_kg(&self, spacing_mm: &Vector3<f64>) -> f64 {
        voxel_mass_kg(spacing_mm, self.density_g_cm3)
    }

    /// Dose for a grid that already represents the physical photon fluence.
    pub fn compute_physical(&self, energy_kev: &VoxelGrid) -> VoxelGrid {
        self.compute(energy_kev, 1.0)
    }

    /// Dose for a grid whose energies are multiplied by `event_scale` first.
    pub fn compute(&self, energy_kev: &VoxelGrid, event_scale: f64) -> VoxelGrid {
        let mass_kg = self.voxel_mass_kg(energy_kev.spacing());
        debug!(
            "Voxel mass {:.6e} kg (density {} g/cm3), event scale {:.6e}",
            mass_kg, self.density_g_cm3, event_scale
        );
        if !(mass_kg.is_finite() && mass_kg > 0.0) {
            warn!(
                "Voxel mass is {} kg; dose values will not be finite.",
                mass_kg
            );
        }
        energy_kev.map(|e| dose_gy(e, event_scale, mass_kg))
    }

    /// Inverse of [`DoseEngine::compute_physical`]: the energy (keV) each voxel absorbed.
    pub fn energy_from_dose(&self, dose_gy: &VoxelGrid) -> VoxelGrid {
        let mass_kg = self.voxel_mass_kg(dose_gy.spacing());
        dose_gy.map(|d| joules_to_kev(d * mass_kg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::grid::GridGeometry;
    use nalgebra::Point3;

    fn rel_approx_equal(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * a.abs().max(b.abs())
    }

    fn energy_grid(values: Vec<f64>, spacing: f64) -> VoxelGrid {
        let n = values.len();
        let geometry = GridGeometry::new(
            [n, 1, 1],
            Point3::origin(),
            Vector3::new(spacing, spacing, spacing),
        )
        .unwrap();
        VoxelGrid::new(geometry, values).unwrap()
    }

    #[test]
    fn two_by_two_grid_matches_closed_form_dose() {
        let geometry =
            GridGeometry::new([2, 2, 1], Point3::origin(), Vector3::new(2.0, 2.0, 2.0)).unwrap();
        let energy = VoxelGrid::new(geometry, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let engine = DoseEngine::new(1.0);

        assert!(rel_approx_equal(engine.voxel_mass_kg(energy.spacing()), 8e-6, 1e-12));

        let dose = engine.compute_physical(&energy);
        assert_eq!(dose.dims(), [2, 2, 1]);
        for (d, e) in dose.values().iter().zip(energy.values()) {
            let expected = e * 1000.0 * 1.602176634e-19 / 8e-6;
            assert!(rel_approx_equal(*d, expected, 1e-6), "{d} vs {expected}");
        }
    }

    #[test]
    fn dose_is_linear_in_event_scale() {
        let energy = energy_grid(vec![0.0, 1.5, 42.0, 1e4], 0.2);
        let engine = DoseEngine::new(1.8);
        let unit = engine.compute(&energy, 1.0);
        for scale in [0.0, 0.5, 3.0, 2.5e4] {
            let scaled = engine.compute(&energy, scale);
            for (s, u) in scaled.values().iter().zip(unit.values()) {
                assert!(rel_approx_equal(*s, scale * u, 1e-12));
            }
        }
    }

    #[test]
    fn doubling_density_halves_dose() {
        let energy = energy_grid(vec![5.0, 7.0], 1.0);
        let light = DoseEngine::new(1.0).compute_physical(&energy);
        let heavy = DoseEngine::new(2.0).compute_physical(&energy);
        for (l, h) in light.values().iter().zip(heavy.values()) {
            assert!(rel_approx_equal(*l, 2.0 * h, 1e-12));
        }
    }

    #[test]
    fn doubling_each_spacing_divides_dose_by_eight() {
        let small = DoseEngine::new(1.0).compute_physical(&energy_grid(vec![10.0], 1.0));
        let large = DoseEngine::new(1.0).compute_physical(&energy_grid(vec![10.0], 2.0));
        assert!(rel_approx_equal(small.values()[0], 8.0 * large.values()[0], 1e-12));
    }

    #[test]
    fn output_shares_geometry_and_leaves_input_untouched() {
        let energy = energy_grid(vec![1.0, 2.0], 0.5);
        let dose = DoseEngine::new(1.0).compute(&energy, 2.0);
        assert_eq!(dose.geometry(), energy.geometry());
        assert_eq!(energy.values(), &[1.0, 2.0]);
    }

    #[test]
    fn zero_density_yields_non_finite_dose() {
        let energy = energy_grid(vec![1.0, 0.0], 1.0);
        let dose = DoseEngine::new(0.0).compute_physical(&energy);
        assert!(dose.values()[0].is_infinite());
        assert!(dose.values()[1].is_nan());
    }

    #[test]
    fn energy_from_dose_inverts_physical_dose() {
        let energy = energy_grid(vec![3.0, 900.0], 0.2);
        let engine = DoseEngine::new(1.8);
        let recovered = engine.energy_from_dose(&engine.compute_physical(&energy));
        for (r, e) in recovered.values().iter().zip(energy.values()) {
            assert!(rel_approx_equal(*r, *e, 1e-12));
        }
    }
}
