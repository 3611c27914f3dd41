//! Data models for voxel grids and the derived fields computed from them.
//!
//! A [`grid::VoxelGrid`] is a value type: every transform produces a new grid that shares
//! its geometry with the source instead of mutating values in place. A
//! [`field::DerivedField`] pairs such a grid with a field name and provenance metadata
//! and is only ever written, never read back.

pub mod field;
pub mod grid;
