//! # VoxDose Core Library
//!
//! Converts a regular 3D voxel grid of simulated energy deposition into physically
//! meaningful derived fields: absorbed dose, temperature rise and radiolytic species
//! concentration.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that every layer can be tested on its own.
//!
//! - **[`core`]: The Foundation.** Stateless grid models (`VoxelGrid`, `DerivedField`),
//!   physical constants and unit conversions, deposit tallying, and file I/O (the VTI grid
//!   codec, raw NPY arrays and step-deposit tables).
//!
//! - **[`engine`]: The Transforms.** The setup record with its typed material and beam
//!   parameters, together with the element-wise dose, temperature and radiolysis engines.
//!
//! - **[`workflows`]: The Public API.** One entry point per transform that reads a grid,
//!   runs the engines and persists every derived field through the `OutputWriter`.

pub mod core;
pub mod engine;
pub mod workflows;
