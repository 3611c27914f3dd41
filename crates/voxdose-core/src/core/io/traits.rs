use crate::core::models::grid::VoxelGrid;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing voxel grid file formats.
///
/// Implementors handle format-specific parsing and serialization; the path-based
/// helpers scope every file handle to a single call.
pub trait GridFile {
    /// The type of metadata carried next to the grid in the file.
    type Metadata;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a grid and its metadata from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<(VoxelGrid, Self::Metadata), Self::Error>;

    /// Writes a grid together with its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        grid: &VoxelGrid,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a grid with format-default metadata.
    fn write_grid_to(grid: &VoxelGrid, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a grid from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<(VoxelGrid, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a grid and metadata to a file path, flushing before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        grid: &VoxelGrid,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(grid, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
