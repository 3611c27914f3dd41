use nalgebra::{Point3, Vector3};
use thiserror::Error;

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Whether each sample describes a cell interior or a grid vertex.
///
/// Cell-associated data holds `hi - lo` samples per axis of the document extent,
/// point-associated data holds `hi - lo + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataAssociation {
    #[default]
    Cell,
    Point,
}

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Grid dimension along axis {axis} must be positive")]
    EmptyDimension { axis: char },
    #[error("Grid spacing along axis {axis} must be a finite positive length (got {value})")]
    InvalidSpacing { axis: char, value: f64 },
    #[error("Grid holds {found} values but its dimensions require {expected}")]
    SizeMismatch { expected: usize, found: usize },
    #[error("Grid dimensions {dims:?} describe more voxels than can be addressed")]
    TooLarge { dims: [usize; 3] },
}

pub(crate) fn checked_voxel_count(dims: [usize; 3]) -> Option<usize> {
    dims[0].checked_mul(dims[1])?.checked_mul(dims[2])
}

/// Physical layout of a regular, axis-aligned grid. Lengths are in millimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub dims: [usize; 3],
    pub origin: Point3<f64>,
    pub spacing: Vector3<f64>,
}

impl GridGeometry {
    pub fn new(
        dims: [usize; 3],
        origin: Point3<f64>,
        spacing: Vector3<f64>,
    ) -> Result<Self, GridError> {
        for (axis, &n) in AXES.iter().zip(dims.iter()) {
            if n == 0 {
                return Err(GridError::EmptyDimension { axis: *axis });
            }
        }
        if checked_voxel_count(dims).is_none() {
            return Err(GridError::TooLarge { dims });
        }
        for (axis, &d) in AXES.iter().zip(spacing.iter()) {
            if !d.is_finite() || d <= 0.0 {
                return Err(GridError::InvalidSpacing {
                    axis: *axis,
                    value: d,
                });
            }
        }
        Ok(Self {
            dims,
            origin,
            spacing,
        })
    }

    /// A grid spanning `[-half, +half]` mm on every axis, split into `counts` cells.
    pub fn centered_cube(counts: [usize; 3], half_size_mm: f64) -> Result<Self, GridError> {
        let edge = 2.0 * half_size_mm;
        let spacing = Vector3::new(
            edge / counts[0] as f64,
            edge / counts[1] as f64,
            edge / counts[2] as f64,
        );
        Self::new(
            counts,
            Point3::new(-half_size_mm, -half_size_mm, -half_size_mm),
            spacing,
        )
    }

    /// Saturates at `usize::MAX` for dims that bypassed [`GridGeometry::new`].
    pub fn voxel_count(&self) -> usize {
        checked_voxel_count(self.dims).unwrap_or(usize::MAX)
    }

    /// Flat index with x varying fastest, then y, then z.
    pub fn linear_index(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        (i < nx && j < ny && k < nz).then(|| i + nx * (j + ny * k))
    }

    /// The cell containing `position`, or `None` when it lies outside the grid.
    pub fn cell_containing(&self, position: &Point3<f64>) -> Option<[usize; 3]> {
        let offset = position - self.origin;
        let mut index = [0usize; 3];
        for axis in 0..3 {
            let f = (offset[axis] / self.spacing[axis]).floor();
            if !f.is_finite() || f < 0.0 || f >= self.dims[axis] as f64 {
                return None;
            }
            index[axis] = f as usize;
        }
        Some(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub non_finite: usize,
}

/// A scalar field sampled on a regular 3D grid.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    geometry: GridGeometry,
    association: DataAssociation,
    values: Vec<f64>,
}

impl VoxelGrid {
    pub fn new(geometry: GridGeometry, values: Vec<f64>) -> Result<Self, GridError> {
        Self::with_association(geometry, DataAssociation::Cell, values)
    }

    pub fn with_association(
        geometry: GridGeometry,
        association: DataAssociation,
        values: Vec<f64>,
    ) -> Result<Self, GridError> {
        let expected = geometry.voxel_count();
        if values.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                found: values.len(),
            });
        }
        Ok(Self {
            geometry,
            association,
            values,
        })
    }

    pub fn zeros(geometry: GridGeometry) -> Self {
        let values = vec![0.0; geometry.voxel_count()];
        Self {
            geometry,
            association: DataAssociation::Cell,
            values,
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn dims(&self) -> [usize; 3] {
        self.geometry.dims
    }

    pub fn origin(&self) -> &Point3<f64> {
        &self.geometry.origin
    }

    pub fn spacing(&self) -> &Vector3<f64> {
        &self.geometry.spacing
    }

    pub fn association(&self) -> DataAssociation {
        self.association
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        self.geometry
            .linear_index(i, j, k)
            .map(|idx| self.values[idx])
    }

    /// Applies `f` to every sample, producing a new grid with the same geometry.
    pub fn map<F>(&self, f: F) -> VoxelGrid
    where
        F: Fn(f64) -> f64,
    {
        VoxelGrid {
            geometry: self.geometry.clone(),
            association: self.association,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    /// Min, max and mean over the finite samples; non-finite samples are only counted.
    pub fn stats(&self) -> FieldStats {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut finite = 0usize;
        for &v in &self.values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
                sum += v;
                finite += 1;
            }
        }
        if finite == 0 {
            return FieldStats {
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                non_finite: self.values.len(),
            };
        }
        FieldStats {
            min,
            max,
            mean: sum / finite as f64,
            non_finite: self.values.len() - finite,
        }
    }
}
