use super::config::{ConfigError, MaterialSpec};
use super::dose::DoseEngine;
use crate::core::models::grid::VoxelGrid;
use tracing::debug;

/// Adiabatic, per-voxel temperature rise: `deltaT = dose / cp`.
///
/// No diffusion between voxels and no phase change. The result is in kelvin, which is
/// numerically the same as a rise in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureEngine {
    heat_capacity_j_kgk: f64,
}

impl TemperatureEngine {
    pub fn new(heat_capacity_j_kgk: f64) -> Self {
        Self {
            heat_capacity_j_kgk,
        }
    }

    pub fn for_material(material: &MaterialSpec) -> Result<Self, ConfigError> {
        Ok(Self::new(material.require_heat_capacity()?))
    }

    pub fn heat_capacity_j_kgk(&self) -> f64 {
        self.heat_capacity_j_kgk
    }

    pub fn compute(&self, dose_gy: &VoxelGrid) -> VoxelGrid {
        debug!("Temperature rise with cp = {} J/kg/K", self.heat_capacity_j_kgk);
        let cp = self.heat_capacity_j_kgk;
        dose_gy.map(|d| d / cp)
    }

    /// Runs `dose` then [`TemperatureEngine::compute`], returning both grids.
    pub fn compute_from_energy(
        &self,
        energy_kev: &VoxelGrid,
        dose: &DoseEngine,
        event_scale: f64,
    ) -> (VoxelGrid, VoxelGrid) {
        let dose_gy = dose.compute(energy_kev, event_scale);
        let delta_t = self.compute(&dose_gy);
        (dose_gy, delta_t)
    }
}
