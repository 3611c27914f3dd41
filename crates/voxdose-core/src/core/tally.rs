use super::io::deposits::StepDeposit;
use super::models::grid::{GridGeometry, VoxelGrid};
use nalgebra::Point3;

/// Accumulates point energy deposits (keV) into the cells of a grid.
///
/// Deposits falling outside the grid are dropped and counted.
#[derive(Debug, Clone)]
pub struct EnergyTally {
    grid: VoxelGrid,
    ignored: usize,
    deposited_kev: f64,
}

impl EnergyTally {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            grid: VoxelGrid::zeros(geometry),
            ignored: 0,
            deposited_kev: 0.0,
        }
    }

    /// Returns `false` when the position lies outside the grid.
    pub fn deposit(&mut self, position_mm: &Point3<f64>, edep_kev: f64) -> bool {
        let geometry = self.grid.geometry();
        let Some(idx) = geometry
            .cell_containing(position_mm)
            .and_then(|[i, j, k]| geometry.linear_index(i, j, k))
        else {
            self.ignored += 1;
            return false;
        };
        self.grid.values_mut()[idx] += edep_kev;
        self.deposited_kev += edep_kev;
        true
    }

    pub fn extend<'a>(&mut self, deposits: impl IntoIterator<Item = &'a StepDeposit>) {
        for step in deposits {
            self.deposit(&step.position_mm, step.edep_kev);
        }
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Total energy that landed inside the grid.
    pub fn deposited_kev(&self) -> f64 {
        self.deposited_kev
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn into_grid(self) -> VoxelGrid {
        self.grid
    }
}
