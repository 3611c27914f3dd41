use super::npy::{NpyError, NpyFile};
use super::vti::{VtiError, VtiFile};
use crate::core::models::field::DerivedField;
use crate::core::models::grid::FieldStats;
use std::ffi::OsString;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output directory '{0}' does not exist")]
    MissingDirectory(String),
    #[error("I/O error while writing '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to encode grid document: {0}")]
    Vti(#[from] VtiError),
    #[error("Failed to encode raw array: {0}")]
    Npy(#[from] NpyError),
}

/// A field that has been staged (and, after `commit`, persisted).
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenField {
    pub name: String,
    pub npy_path: Option<PathBuf>,
    pub vti_path: PathBuf,
    pub stats: FieldStats,
}

/// Persists derived fields under a common path prefix.
///
/// Files are first written to temporary files inside the destination directory and only
/// moved to their final names by [`OutputWriter::commit`]. Dropping the writer without
/// committing removes everything staged so far. The destination directory is never created.
pub struct OutputWriter {
    prefix: PathBuf,
    directory: PathBuf,
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl OutputWriter {
    pub fn new(prefix: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let prefix = prefix.into();
        let directory = match prefix.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !directory.is_dir() {
            return Err(OutputError::MissingDirectory(
                directory.to_string_lossy().to_string(),
            ));
        }
        Ok(Self {
            prefix,
            directory,
            staged: Vec::new(),
        })
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// `<prefix><suffix>`, e.g. `output/temp_dose_Gy.npy`.
    pub fn path_for(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.prefix.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Stages `<prefix>_<name>.npy` and `<prefix>_<name>.vti`.
    pub fn stage_field(&mut self, field: &DerivedField) -> Result<WrittenField, OutputError> {
        let suffix = field.file_suffix();
        let npy_path = self.path_for(&format!("{}.npy", suffix));
        let vti_path = self.path_for(&format!("{}.vti", suffix));

        self.stage(npy_path.clone(), |w| Ok(NpyFile::write_grid_to(&field.grid, w)?))?;
        self.stage(vti_path.clone(), |w| Ok(VtiFile::write_field_to(field, w)?))?;

        Ok(report(WrittenField {
            name: field.name.clone(),
            npy_path: Some(npy_path),
            vti_path,
            stats: field.grid.stats(),
        }))
    }

    /// Stages only the grid document, at `<prefix>.vti`.
    pub fn stage_document(&mut self, field: &DerivedField) -> Result<WrittenField, OutputError> {
        let vti_path = self.path_for(".vti");
        self.stage(vti_path.clone(), |w| Ok(VtiFile::write_field_to(field, w)?))?;
        Ok(report(WrittenField {
            name: field.name.clone(),
            npy_path: None,
            vti_path,
            stats: field.grid.stats(),
        }))
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Moves every staged file to its final path, returning the paths in staging order.
    pub fn commit(self) -> Result<Vec<PathBuf>, OutputError> {
        let mut persisted = Vec::with_capacity(self.staged.len());
        for (file, target) in self.staged {
            file.persist(&target).map_err(|e| OutputError::Io {
                path: target.to_string_lossy().to_string(),
                source: e.error,
            })?;
            debug!("Persisted {:?}", target);
            persisted.push(target);
        }
        Ok(persisted)
    }

    fn stage<F>(&mut self, target: PathBuf, write: F) -> Result<(), OutputError>
    where
        F: FnOnce(&mut BufWriter<&std::fs::File>) -> Result<(), OutputError>,
    {
        let io_error = |source: io::Error| OutputError::Io {
            path: target.to_string_lossy().to_string(),
            source,
        };
        let file = NamedTempFile::new_in(&self.directory).map_err(io_error)?;
        {
            let mut writer = BufWriter::new(file.as_file());
            write(&mut writer)?;
            writer.flush().map_err(io_error)?;
        }
        self.staged.push((file, target));
        Ok(())
    }
}

fn report(written: WrittenField) -> WrittenField {
    let stats = &written.stats;
    info!(
        "{}: min={:.6e} max={:.6e} mean={:.6e} -> {:?}",
        written.name, stats.min, stats.max, stats.mean, written.vti_path
    );
    if stats.non_finite > 0 {
        warn!(
            "{} contains {} non-finite value(s); check the material density and voxel spacing.",
            written.name, stats.non_finite
        );
    }
    written
}
