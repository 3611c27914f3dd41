//! File formats read and written by the pipeline.
//!
//! - [`traits`] - The `GridFile` interface shared by grid codecs
//! - [`vti`] - The structured-grid (VTK ImageData, ASCII) codec
//! - [`npy`] - Raw single-precision array artifacts
//! - [`deposits`] - Step-level energy deposits exported by a Monte-Carlo run
//! - [`output`] - Staged, all-or-nothing persistence of derived fields

pub mod deposits;
pub mod npy;
pub mod output;
pub mod traits;
pub mod vti;
