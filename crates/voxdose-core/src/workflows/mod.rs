//! # Workflows Module
//!
//! Top-level entry points. Each one reads its input, runs one transform and persists the
//! derived fields through an [`OutputWriter`], reporting progress along the way.
//!
//! - **Dose** ([`dose`]) - Physical-fluence dose from an energy-deposition grid
//! - **Heat** ([`heat`]) - Event-scaled dose and temperature rise, or temperature rise from
//!   an existing dose grid
//! - **Radiolysis** ([`radiolysis`]) - Species concentrations from a configured G-value table
//!   or from the built-in bulk-water table
//! - **Tally** ([`tally`]) - Binning of step deposits into an energy-deposition grid
//!
//! Outputs are all-or-nothing: a workflow that fails leaves no file behind.

use crate::core::io::output::{OutputWriter, WrittenField};
use crate::core::io::traits::GridFile;
use crate::core::io::vti::VtiFile;
use crate::core::models::field::DerivedField;
use crate::core::models::grid::VoxelGrid;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod dose;
pub mod heat;
pub mod radiolysis;
pub mod tally;

/// Fields written by a workflow and the files they landed in.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOutput {
    pub fields: Vec<WrittenField>,
    pub paths: Vec<PathBuf>,
}

impl WorkflowOutput {
    pub fn field(&self, name: &str) -> Option<&WrittenField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn read_grid(path: &Path, reporter: &ProgressReporter) -> Result<VoxelGrid, EngineError> {
    reporter.phase("Reading grid", || -> Result<VoxelGrid, EngineError> {
        let (grid, metadata) =
            VtiFile::read_from_path(path).map_err(|e| EngineError::GridRead {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        info!(
            "Read {:?}: dims {:?}, {:?} data, array {:?}",
            path,
            grid.dims(),
            grid.association(),
            metadata.array_name.as_deref().unwrap_or("<unnamed>")
        );
        debug!("Origin {:?} mm, spacing {:?} mm", grid.origin(), grid.spacing());
        Ok(grid)
    })
}

fn write_fields(
    output_prefix: &Path,
    fields: &[DerivedField],
    reporter: &ProgressReporter,
) -> Result<WorkflowOutput, EngineError> {
    let mut writer = OutputWriter::new(output_prefix)?;
    reporter.report(Progress::OutputsStart {
        total_fields: fields.len() as u64,
    });
    let mut written = Vec::with_capacity(fields.len());
    for field in fields {
        written.push(writer.stage_field(field)?);
        reporter.report(Progress::FieldStaged {
            name: field.name.clone(),
        });
    }
    let paths = writer.commit()?;
    reporter.report(Progress::OutputsFinish);
    info!("Wrote {} file(s) under prefix {:?}", paths.len(), output_prefix);
    Ok(WorkflowOutput {
        fields: written,
        paths,
    })
}
