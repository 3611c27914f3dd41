use crate::core::models::grid::VoxelGrid;
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const MAGIC: &[u8] = b"\x93NUMPY";
const VERSION: [u8; 2] = [1, 0];
/// Header plus preamble is padded to a multiple of this many bytes.
const HEADER_ALIGNMENT: usize = 64;

#[derive(Debug, Error)]
pub enum NpyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Array shape {shape:?} describes {expected} elements but {found} were supplied")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        found: usize,
    },
    #[error("NPY header of {0} bytes exceeds the version 1.0 limit")]
    HeaderTooLarge(usize),
}

/// Writer for raw little-endian `float32` arrays in the NPY v1.0 layout.
pub struct NpyFile;

impl NpyFile {
    /// C-order shape of a grid whose flat samples run x fastest: `(nz, ny, nx)`.
    pub fn grid_shape(grid: &VoxelGrid) -> [usize; 3] {
        let [nx, ny, nz] = grid.dims();
        [nz, ny, nx]
    }

    pub fn write_grid_to(grid: &VoxelGrid, writer: &mut impl Write) -> Result<(), NpyError> {
        Self::write_f32_to(&grid.to_f32(), &Self::grid_shape(grid), writer)
    }

    pub fn write_grid_to_path<P: AsRef<Path>>(grid: &VoxelGrid, path: P) -> Result<(), NpyError> {
        let mut writer = BufWriter::new(File::create(path)?);
        Self::write_grid_to(grid, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_f32_to(
        values: &[f32],
        shape: &[usize],
        writer: &mut impl Write,
    ) -> Result<(), NpyError> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(NpyError::ShapeMismatch {
                shape: shape.to_vec(),
                expected,
                found: values.len(),
            });
        }

        let header = header_for(shape);
        let header_len =
            u16::try_from(header.len()).map_err(|_| NpyError::HeaderTooLarge(header.len()))?;

        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION)?;
        writer.write_u16::<LittleEndian>(header_len)?;
        writer.write_all(header.as_bytes())?;
        for &v in values {
            writer.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    }
}

fn header_for(shape: &[usize]) -> String {
    let dims = match shape {
        [single] => format!("({},)", single),
        _ => format!(
            "({})",
            shape
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    let dict = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': {}, }}",
        dims
    );
    let unpadded = MAGIC.len() + VERSION.len() + 2 + dict.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    format!("{}{}\n", dict, " ".repeat(padding))
}
