//! # Core Module
//!
//! Fundamental building blocks shared by every transform.
//!
//! - **Grid Representation** ([`models`]) - Voxel grids, their geometry and derived fields
//! - **Physical Units** ([`constants`], [`units`]) - CODATA constants and the keV/mm/g·cm⁻³
//!   conversions used across the pipeline
//! - **File I/O** ([`io`]) - The VTI grid codec, raw NPY arrays and step-deposit tables
//! - **Accumulation** ([`tally`]) - Binning of point energy deposits into a voxel grid

pub mod constants;
pub mod io;
pub mod models;
pub mod tally;
pub mod units;
