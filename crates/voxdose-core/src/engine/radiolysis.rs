use super::config::GValueTable;
use super::dose::DoseEngine;
use crate::core::constants::AVOGADRO_PER_MOL;
use crate::core::models::grid::VoxelGrid;
use crate::core::units::{kev_to_g_value_units, voxel_volume_liters};
use tracing::debug;

/// Concentration and production rate of one radiolytic species.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesYield {
    pub species: String,
    pub g_value: f64,
    /// mol/L
    pub concentration_m: VoxelGrid,
    /// mol/L/s; all zeros when the exposure time is zero.
    pub rate_m_per_s: VoxelGrid,
}

impl SpeciesYield {
    pub fn concentration_field_name(&self) -> String {
        format!("{}_M", self.species)
    }

    pub fn rate_field_name(&self) -> String {
        format!("{}_rate_Mps", self.species)
    }
}

/// Per-species results, in the order of the G-value table they were computed from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadiolysisYields {
    species: Vec<SpeciesYield>,
}

impl RadiolysisYields {
    pub fn get(&self, species: &str) -> Option<&SpeciesYield> {
        self.species.iter().find(|s| s.species == species)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesYield> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl IntoIterator for RadiolysisYields {
    type Item = SpeciesYield;
    type IntoIter = std::vec::IntoIter<SpeciesYield>;

    fn into_iter(self) -> Self::IntoIter {
        self.species.into_iter()
    }
}

/// Turns absorbed energy into species concentrations via G-values (molecules / 100 eV).
#[derive(Debug, Clone, Copy)]
pub struct RadiolysisEngine<'a> {
    g_values: &'a GValueTable,
}

impl<'a> RadiolysisEngine<'a> {
    pub fn new(g_values: &'a GValueTable) -> Self {
        Self { g_values }
    }

    pub fn g_values(&self) -> &GValueTable {
        self.g_values
    }

    pub fn compute(
        &self,
        energy_kev: &VoxelGrid,
        event_scale: f64,
        exposure_s: f64,
    ) -> RadiolysisYields {
        let volume_l = voxel_volume_liters(energy_kev.spacing());
        debug!(
            "Radiolysis over {} species, voxel volume {:.6e} L, exposure {} s",
            self.g_values.len(),
            volume_l,
            exposure_s
        );

        let species = self
            .g_values
            .iter()
            .map(|(species, g)| {
                let concentration_m = energy_kev.map(|e| {
                    let molecules = kev_to_g_value_units(e * event_scale) * g;
                    molecules / AVOGADRO_PER_MOL / volume_l
                });
                let rate_m_per_s = if exposure_s > 0.0 {
                    concentration_m.map(|c| c / exposure_s)
                } else {
                    concentration_m.map(|_| 0.0)
                };
                SpeciesYield {
                    species: species.to_string(),
                    g_value: g,
                    concentration_m,
                    rate_m_per_s,
                }
            })
            .collect();
        RadiolysisYields { species }
    }

    /// Same as [`RadiolysisEngine::compute`] with the per-voxel energy recovered from a dose
    /// grid through the voxel mass.
    pub fn compute_from_dose(
        &self,
        dose_gy: &VoxelGrid,
        dose: &DoseEngine,
        exposure_s: f64,
    ) -> RadiolysisYields {
        self.compute(&dose.energy_from_dose(dose_gy), 1.0, exposure_s)
    }
}
