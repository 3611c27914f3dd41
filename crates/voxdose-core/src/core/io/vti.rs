use crate::core::io::traits::GridFile;
use crate::core::models::field::{DerivedField, FieldMetadata};
use crate::core::models::grid::{DataAssociation, GridGeometry, VoxelGrid, checked_voxel_count};
use nalgebra::{Point3, Vector3};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Significant digits used for geometry attributes and array samples.
const SIGNIFICANT_DIGITS: usize = 9;
const VALUES_PER_LINE: usize = 8;
const DEFAULT_ARRAY_NAME: &str = "scalars";

#[derive(Debug, Error)]
pub enum VtiError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed grid document: {0}")]
    Format(String),
    #[error("Grid data size mismatch: array holds {found} values but the extent requires {expected}")]
    SizeMismatch { expected: usize, found: usize },
}

/// Everything in a VTI document besides the geometry and samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VtiMetadata {
    /// Name of the scalar array; written as the `CellData Scalars` attribute.
    pub array_name: Option<String>,
    /// Named string fields stored in the `FieldData` block.
    pub field_data: FieldMetadata,
}

impl VtiMetadata {
    pub fn for_field(field: &DerivedField) -> Self {
        Self {
            array_name: Some(field.name.clone()),
            field_data: field.metadata.clone(),
        }
    }
}

pub struct VtiFile;

impl VtiFile {
    pub fn write_field_to(field: &DerivedField, writer: &mut impl Write) -> Result<(), VtiError> {
        Self::write_to(&field.grid, &VtiMetadata::for_field(field), writer)
    }
}

impl GridFile for VtiFile {
    type Metadata = VtiMetadata;
    type Error = VtiError;

    fn read_from(reader: &mut impl BufRead) -> Result<(VoxelGrid, Self::Metadata), Self::Error> {
        let mut document = String::new();
        reader.read_to_string(&mut document)?;
        let parsed = scan_document(&document)?;
        build_grid(parsed)
    }

    fn write_to(
        grid: &VoxelGrid,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let [nx, ny, nz] = grid.dims();
        let extent = format!("0 {} 0 {} 0 {}", nx, ny, nz);
        let origin = grid.origin();
        let spacing = grid.spacing();
        let name = escape(metadata.array_name.as_deref().unwrap_or(DEFAULT_ARRAY_NAME));

        writeln!(writer, r#"<?xml version="1.0"?>"#)?;
        writeln!(
            writer,
            r#"<VTKFile type="ImageData" version="0.1" byte_order="LittleEndian">"#
        )?;
        writeln!(
            writer,
            r#"  <ImageData WholeExtent="{}" Origin="{} {} {}" Spacing="{} {} {}">"#,
            extent,
            format_significant(origin.x, SIGNIFICANT_DIGITS),
            format_significant(origin.y, SIGNIFICANT_DIGITS),
            format_significant(origin.z, SIGNIFICANT_DIGITS),
            format_significant(spacing.x, SIGNIFICANT_DIGITS),
            format_significant(spacing.y, SIGNIFICANT_DIGITS),
            format_significant(spacing.z, SIGNIFICANT_DIGITS),
        )?;

        if !metadata.field_data.is_empty() {
            writeln!(writer, "    <FieldData>")?;
            for (key, value) in metadata.field_data.iter() {
                writeln!(
                    writer,
                    r#"      <DataArray type="String" Name="{}" format="ascii" NumberOfComponents="1" NumberOfTuples="1">"#,
                    escape(key)
                )?;
                writeln!(writer, "        {}", escape(value))?;
                writeln!(writer, "      </DataArray>")?;
            }
            writeln!(writer, "    </FieldData>")?;
        }

        writeln!(writer, r#"    <Piece Extent="{}">"#, extent)?;
        writeln!(writer, "      <PointData/>")?;
        writeln!(writer, r#"      <CellData Scalars="{}">"#, name)?;
        writeln!(
            writer,
            r#"        <DataArray type="Float32" Name="{}" format="ascii">"#,
            name
        )?;
        for chunk in grid.values().chunks(VALUES_PER_LINE) {
            let line: Vec<String> = chunk
                .iter()
                .map(|&v| format_significant(v as f32 as f64, SIGNIFICANT_DIGITS))
                .collect();
            writeln!(writer, "          {}", line.join(" "))?;
        }
        writeln!(writer, "        </DataArray>")?;
        writeln!(writer, "      </CellData>")?;
        writeln!(writer, "    </Piece>")?;
        writeln!(writer, "  </ImageData>")?;
        writeln!(writer, "</VTKFile>")?;
        Ok(())
    }

    fn write_grid_to(grid: &VoxelGrid, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(grid, &VtiMetadata::default(), writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Cell,
    Point,
    Field,
    Other,
}

#[derive(Debug)]
struct RawArray {
    section: Section,
    name: Option<String>,
    format: Option<String>,
    text: String,
}

#[derive(Debug, Default)]
struct ParsedDocument {
    image_attrs: Option<Vec<(String, String)>>,
    cell_scalars: Option<String>,
    arrays: Vec<RawArray>,
}

fn scan_document(document: &str) -> Result<ParsedDocument, VtiError> {
    let mut reader = Reader::from_str(document);
    let mut parsed = ParsedDocument::default();
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<RawArray> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(tag) => {
                let name = open_element(&tag, &stack, &mut parsed, &mut current, false)?;
                stack.push(name);
            }
            Event::Empty(tag) => {
                open_element(&tag, &stack, &mut parsed, &mut current, true)?;
            }
            Event::End(tag) => {
                // End names are matched against their start tags by the reader.
                let name = utf8(tag.name().as_ref())?.to_string();
                stack.pop();
                if name == "DataArray" {
                    if let Some(array) = current.take() {
                        parsed.arrays.push(array);
                    }
                }
            }
            Event::Text(text) => {
                if let Some(array) = current.as_mut() {
                    array.text.push_str(&text.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(array) = current.as_mut() {
                    array.text.push_str(utf8(&data)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(VtiError::Format(format!("element <{}> is never closed", open)));
    }
    Ok(parsed)
}

/// Records the parts of an opening tag the grid reader cares about and returns its name.
fn open_element(
    tag: &BytesStart,
    stack: &[String],
    parsed: &mut ParsedDocument,
    current: &mut Option<RawArray>,
    self_closing: bool,
) -> Result<String, VtiError> {
    let name = utf8(tag.name().as_ref())?.to_string();
    match name.as_str() {
        "ImageData" if parsed.image_attrs.is_none() => {
            parsed.image_attrs = Some(attributes_of(tag)?);
        }
        "CellData" if parsed.cell_scalars.is_none() => {
            let attrs = attributes_of(tag)?;
            parsed.cell_scalars = attribute(&attrs, "Scalars").map(str::to_string);
        }
        "DataArray" => {
            let section = match stack.last().map(String::as_str) {
                Some("CellData") => Section::Cell,
                Some("PointData") => Section::Point,
                Some("FieldData") => Section::Field,
                _ => Section::Other,
            };
            let attrs = attributes_of(tag)?;
            let array = RawArray {
                section,
                name: attribute(&attrs, "Name").map(str::to_string),
                format: attribute(&attrs, "format").map(str::to_string),
                text: String::new(),
            };
            if self_closing {
                parsed.arrays.push(array);
            } else {
                *current = Some(array);
            }
        }
        _ => {}
    }
    Ok(name)
}

fn attributes_of(tag: &BytesStart) -> Result<Vec<(String, String)>, VtiError> {
    tag.attributes()
        .map(|attr| -> Result<(String, String), VtiError> {
            let attr = attr.map_err(xml_error)?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            Ok((key, value))
        })
        .collect()
}

fn utf8(bytes: &[u8]) -> Result<&str, VtiError> {
    std::str::from_utf8(bytes)
        .map_err(|e| VtiError::Format(format!("document is not valid UTF-8: {}", e)))
}

fn xml_error(err: impl Display) -> VtiError {
    VtiError::Format(format!("invalid XML: {}", err))
}

fn build_grid(parsed: ParsedDocument) -> Result<(VoxelGrid, VtiMetadata), VtiError> {
    let image = parsed
        .image_attrs
        .ok_or_else(|| VtiError::Format("no ImageData element found".into()))?;

    let spacing: [f64; 3] = parse_numbers(required_attr(&image, "Spacing")?, "Spacing")?;
    let origin: [f64; 3] = parse_numbers(required_attr(&image, "Origin")?, "Origin")?;
    let extent: [i64; 6] = parse_numbers(required_attr(&image, "WholeExtent")?, "WholeExtent")?;

    let mut field_data = FieldMetadata::new();
    for array in parsed.arrays.iter().filter(|a| a.section == Section::Field) {
        if let Some(name) = &array.name {
            field_data.insert_text(name.clone(), array.text.trim());
        }
    }

    let cell_arrays: Vec<&RawArray> = parsed
        .arrays
        .iter()
        .filter(|a| a.section == Section::Cell)
        .collect();
    let (array, association) = match cell_arrays
        .iter()
        .find(|a| a.name.is_some() && a.name == parsed.cell_scalars)
        .or_else(|| cell_arrays.first())
    {
        Some(array) => (*array, DataAssociation::Cell),
        None => parsed
            .arrays
            .iter()
            .find(|a| a.section == Section::Point)
            .map(|a| (a, DataAssociation::Point))
            .ok_or_else(|| {
                VtiError::Format("no CellData or PointData DataArray found".into())
            })?,
    };

    let label = array.name.as_deref().unwrap_or("<unnamed>");
    if let Some(format) = &array.format {
        if format != "ascii" {
            return Err(VtiError::Format(format!(
                "DataArray '{}' uses unsupported format '{}'; only ascii is supported",
                label, format
            )));
        }
    }
    if array.text.trim().is_empty() {
        return Err(VtiError::Format(format!("DataArray '{}' holds no data", label)));
    }

    let values = array
        .text
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                VtiError::Format(format!("invalid value '{}' in DataArray '{}'", token, label))
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let dims = dims_from_extent(&extent, association)?;
    let expected = checked_voxel_count(dims).ok_or_else(|| {
        VtiError::Format(format!(
            "WholeExtent describes {:?} samples per axis, more than can be addressed",
            dims
        ))
    })?;
    if values.len() != expected {
        return Err(VtiError::SizeMismatch {
            expected,
            found: values.len(),
        });
    }

    let geometry = GridGeometry::new(
        dims,
        Point3::new(origin[0], origin[1], origin[2]),
        Vector3::new(spacing[0], spacing[1], spacing[2]),
    )
    .map_err(|e| VtiError::Format(e.to_string()))?;
    let grid = VoxelGrid::with_association(geometry, association, values)
        .map_err(|e| VtiError::Format(e.to_string()))?;

    Ok((
        grid,
        VtiMetadata {
            array_name: array.name.clone(),
            field_data,
        },
    ))
}

/// Cells per axis are `hi - lo`; points per axis are `hi - lo + 1`.
fn dims_from_extent(
    extent: &[i64; 6],
    association: DataAssociation,
) -> Result<[usize; 3], VtiError> {
    let mut dims = [0usize; 3];
    for axis in 0..3 {
        let (lo, hi) = (extent[2 * axis], extent[2 * axis + 1]);
        if hi < lo {
            return Err(VtiError::Format(format!(
                "WholeExtent upper bound {} is below lower bound {}",
                hi, lo
            )));
        }
        let span = hi
            .checked_sub(lo)
            .and_then(|span| usize::try_from(span).ok())
            .and_then(|span| match association {
                DataAssociation::Cell => Some(span),
                DataAssociation::Point => span.checked_add(1),
            })
            .ok_or_else(|| {
                VtiError::Format(format!("WholeExtent span {}..{} is out of range", lo, hi))
            })?;
        dims[axis] = span;
    }
    Ok(dims)
}

fn attribute<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn required_attr<'a>(attrs: &'a [(String, String)], key: &str) -> Result<&'a str, VtiError> {
    attribute(attrs, key)
        .ok_or_else(|| VtiError::Format(format!("ImageData is missing the '{}' attribute", key)))
}

fn parse_numbers<T, const N: usize>(text: &str, key: &str) -> Result<[T; N], VtiError>
where
    T: std::str::FromStr + Copy + Default,
{
    let parsed: Vec<T> = text
        .split_whitespace()
        .map(|t| t.parse::<T>())
        .collect::<Result<_, _>>()
        .map_err(|_| VtiError::Format(format!("attribute '{}' is not numeric: '{}'", key, text)))?;
    if parsed.len() != N {
        return Err(VtiError::Format(format!(
            "attribute '{}' must hold {} values, found {}",
            key,
            N,
            parsed.len()
        )));
    }
    let mut out = [T::default(); N];
    out.copy_from_slice(&parsed);
    Ok(out)
}

/// `printf("%.*g")`-style formatting: `digits` significant digits, trailing zeros dropped,
/// exponent notation outside `1e-4 <= |v| < 10^digits`.
fn format_significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let digits = digits.max(1);
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_str(doc: &str) -> Result<(VoxelGrid, VtiMetadata), VtiError> {
        VtiFile::read_from(&mut Cursor::new(doc.as_bytes()))
    }

    fn write_to_string(grid: &VoxelGrid, metadata: &VtiMetadata) -> String {
        let mut buffer = Vec::new();
        VtiFile::write_to(grid, metadata, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn sample_grid() -> VoxelGrid {
        let geometry = GridGeometry::new(
            [2, 2, 1],
            Point3::new(-1.5, 0.25, 10.0),
            Vector3::new(2.0, 0.1, 1.0 / 3.0),
        )
        .unwrap();
        VoxelGrid::new(geometry, vec![0.1, 2.5e-7, 3.0, 1.0e12]).unwrap()
    }

    const CELL_DOC: &str = r#"<?xml version="1.0"?>
<VTKFile type="ImageData" version="0.1" byte_order="LittleEndian">
  <ImageData WholeExtent="0 2 0 2 0 1" Origin="0 0 0" Spacing="2 2 2">
    <FieldData>
      <DataArray type="String" Name="material_formula" format="ascii" NumberOfComponents="1">
        H2O
      </DataArray>
    </FieldData>
    <Piece Extent="0 2 0 2 0 1">
      <PointData/>
      <CellData Scalars="edep_keV">
        <DataArray type="Float32" Name="edep_keV" format="ascii">
1 2
   3      4
        </DataArray>
      </CellData>
    </Piece>
  </ImageData>
</VTKFile>
"#;

    #[test]
    fn read_cell_data_uses_extent_without_plus_one() {
        let (grid, meta) = read_str(CELL_DOC).unwrap();
        assert_eq!(grid.dims(), [2, 2, 1]);
        assert_eq!(grid.association(), DataAssociation::Cell);
        assert_eq!(grid.values(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid.spacing(), &Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(meta.array_name.as_deref(), Some("edep_keV"));
        assert_eq!(meta.field_data.get("material_formula"), Some("H2O"));
    }

    #[test]
    fn read_point_only_document_uses_point_semantics() {
        let values: Vec<String> = (0..27).map(|i| i.to_string()).collect();
        let doc = format!(
            r#"<VTKFile type="ImageData">
  <ImageData WholeExtent="0 2 0 2 0 2" Origin="0 0 0" Spacing="1 1 1">
    <Piece Extent="0 2 0 2 0 2">
      <PointData Scalars="phi">
        <DataArray type="Float64" Name="phi" format="ascii">{}</DataArray>
      </PointData>
      <CellData/>
    </Piece>
  </ImageData>
</VTKFile>"#,
            values.join(" ")
        );
        let (grid, _) = read_str(&doc).unwrap();
        assert_eq!(grid.dims(), [3, 3, 3]);
        assert_eq!(grid.association(), DataAssociation::Point);
        assert_eq!(grid.get(2, 2, 2), Some(26.0));
    }

    #[test]
    fn cell_array_is_preferred_over_point_array() {
        let doc = r#"<VTKFile>
  <ImageData WholeExtent="0 1 0 1 0 1" Origin="0 0 0" Spacing="1 1 1">
    <Piece Extent="0 1 0 1 0 1">
      <PointData><DataArray Name="p" format="ascii">1 2 3 4 5 6 7 8</DataArray></PointData>
      <CellData><DataArray Name="c" format="ascii">42</DataArray></CellData>
    </Piece>
  </ImageData>
</VTKFile>"#;
        let (grid, meta) = read_str(doc).unwrap();
        assert_eq!(grid.dims(), [1, 1, 1]);
        assert_eq!(grid.values(), &[42.0]);
        assert_eq!(meta.array_name.as_deref(), Some("c"));
    }

    #[test]
    fn cell_scalars_attribute_selects_among_several_cell_arrays() {
        let doc = r#"<VTKFile>
  <ImageData WholeExtent="0 1 0 1 0 1" Origin="0 0 0" Spacing="1 1 1">
    <Piece>
      <CellData Scalars="second">
        <DataArray Name="first" format="ascii">1</DataArray>
        <DataArray Name="second" format="ascii">2</DataArray>
      </CellData>
    </Piece>
  </ImageData>
</VTKFile>"#;
        let (grid, _) = read_str(doc).unwrap();
        assert_eq!(grid.values(), &[2.0]);
    }

    #[test]
    fn missing_image_data_is_a_format_error() {
        let err = read_str("<VTKFile><PolyData/></VTKFile>").unwrap_err();
        assert!(matches!(err, VtiError::Format(msg) if msg.contains("ImageData")));
    }

    #[test]
    fn missing_geometry_attribute_is_a_format_error() {
        let doc = r#"<VTKFile><ImageData WholeExtent="0 1 0 1 0 1" Origin="0 0 0">
<CellData><DataArray format="ascii">1</DataArray></CellData></ImageData></VTKFile>"#;
        let err = read_str(doc).unwrap_err();
        assert!(matches!(err, VtiError::Format(msg) if msg.contains("Spacing")));
    }

    #[test]
    fn missing_data_array_is_a_format_error() {
        let doc = r#"<VTKFile><ImageData WholeExtent="0 1 0 1 0 1" Origin="0 0 0" Spacing="1 1 1">
<Piece><PointData/><CellData/></Piece></ImageData></VTKFile>"#;
        let err = read_str(doc).unwrap_err();
        assert!(matches!(err, VtiError::Format(msg) if msg.contains("DataArray")));
    }

    #[test]
    fn empty_data_array_is_a_format_error() {
        let doc = r#"<VTKFile><ImageData WholeExtent="0 1 0 1 0 1" Origin="0 0 0" Spacing="1 1 1">
<CellData><DataArray Name="e" format="ascii">   </DataArray></CellData></ImageData></VTKFile>"#;
        let err = read_str(doc).unwrap_err();
        assert!(matches!(err, VtiError::Format(msg) if msg.contains("no data")));
    }

    #[test]
    fn wrong_value_count_is_a_size_mismatch() {
        let doc = CELL_DOC.replace("   3      4", "3");
        let err = read_str(&doc).unwrap_err();
        assert!(matches!(
            err,
            VtiError::SizeMismatch {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn binary_arrays_are_rejected() {
        let doc = CELL_DOC.replace(r#"Name="edep_keV" format="ascii""#, r#"Name="edep_keV" format="binary""#);
        let err = read_str(&doc).unwrap_err();
        assert!(matches!(err, VtiError::Format(msg) if msg.contains("binary")));
    }

    #[test]
    fn non_positive_spacing_is_a_format_error() {
        let doc = CELL_DOC.replace(r#"Spacing="2 2 2""#, r#"Spacing="2 0 2""#);
        let err = read_str(&doc).unwrap_err();
        assert!(matches!(err, VtiError::Format(msg) if msg.contains("spacing")));
    }

    #[test]
    fn inverted_extent_is_a_format_error() {
        let doc = CELL_DOC.replace(r#"WholeExtent="0 2 0 2 0 1""#, r#"WholeExtent="2 0 0 2 0 1""#);
        assert!(matches!(read_str(&doc), Err(VtiError::Format(_))));
    }

    #[test]
    fn extent_span_beyond_i64_is_a_format_error() {
        let doc = CELL_DOC.replace(
            r#"WholeExtent="0 2 0 2 0 1""#,
            r#"WholeExtent="-9223372036854775808 9223372036854775807 0 1 0 1""#,
        );
        let err = read_str(&doc).unwrap_err();
        assert!(matches!(err, VtiError::Format(msg) if msg.contains("out of range")));
    }

    #[test]
    fn extent_whose_voxel_count_overflows_is_a_format_error() {
        let doc = CELL_DOC.replace(
            r#"WholeExtent="0 2 0 2 0 1""#,
            r#"WholeExtent="0 4611686018427387905 0 4 0 1""#,
        );
        let err = read_str(&doc).unwrap_err();
        assert!(matches!(err, VtiError::Format(msg) if msg.contains("addressed")));
    }

    #[test]
    fn round_trip_preserves_geometry_and_single_precision_values() {
        let grid = sample_grid();
        let metadata = VtiMetadata {
            array_name: Some("dose_Gy".into()),
            field_data: FieldMetadata::new()
                .with_text("material_formula", "Ca10(PO4)6(OH)2")
                .with_number("material_density_g_cm3", 1.8),
        };
        let text = write_to_string(&grid, &metadata);
        let (read, read_meta) = read_str(&text).unwrap();

        assert_eq!(read.dims(), grid.dims());
        assert_eq!(read.association(), DataAssociation::Cell);
        for axis in 0..3 {
            let expected_origin: f64 = format_significant(grid.origin()[axis], 9).parse().unwrap();
            let expected_spacing: f64 = format_significant(grid.spacing()[axis], 9).parse().unwrap();
            assert_eq!(read.origin()[axis], expected_origin);
            assert_eq!(read.spacing()[axis], expected_spacing);
        }
        for (written, parsed) in grid.values().iter().zip(read.values()) {
            assert_eq!(*parsed as f32, *written as f32);
        }
        assert_eq!(read_meta, metadata);
    }

    #[test]
    fn point_grid_is_written_back_as_cell_data_with_same_dims() {
        let geometry =
            GridGeometry::new([2, 1, 1], Point3::origin(), Vector3::new(1.0, 1.0, 1.0)).unwrap();
        let grid =
            VoxelGrid::with_association(geometry, DataAssociation::Point, vec![5.0, 6.0]).unwrap();
        let text = write_to_string(&grid, &VtiMetadata::default());
        assert!(text.contains(r#"WholeExtent="0 2 0 1 0 1""#));
        assert!(text.contains(r#"<CellData Scalars="scalars">"#));

        let (read, _) = read_str(&text).unwrap();
        assert_eq!(read.dims(), [2, 1, 1]);
        assert_eq!(read.association(), DataAssociation::Cell);
    }

    #[test]
    fn metadata_with_markup_characters_is_escaped_and_restored() {
        let grid = sample_grid();
        let metadata = VtiMetadata {
            array_name: Some("OH_M".into()),
            field_data: FieldMetadata::new().with_text("note", r#"a < b & "c" > 'd'"#),
        };
        let text = write_to_string(&grid, &metadata);
        assert!(text.contains("a &lt; b &amp; &quot;c&quot; &gt; &apos;d&apos;"));
        let (_, read_meta) = read_str(&text).unwrap();
        assert_eq!(read_meta.field_data.get("note"), Some(r#"a < b & "c" > 'd'"#));
    }

    #[test]
    fn comments_and_cdata_are_handled() {
        let doc = r#"<?xml version="1.0"?>
<!-- produced by a simulation -->
<VTKFile>
  <ImageData WholeExtent="0 2 0 1 0 1" Origin="0 0 0" Spacing="1 1 1">
    <CellData><DataArray Name="e" format="ascii"><![CDATA[7 8]]></DataArray></CellData>
  </ImageData>
</VTKFile>"#;
        let (grid, _) = read_str(doc).unwrap();
        assert_eq!(grid.values(), &[7.0, 8.0]);
    }

    #[test]
    fn mismatched_closing_tag_is_a_format_error() {
        let doc = r#"<VTKFile><ImageData WholeExtent="0 1 0 1 0 1" Origin="0 0 0" Spacing="1 1 1"></VTKFile>"#;
        assert!(matches!(read_str(doc), Err(VtiError::Format(_))));
    }

    #[test]
    fn character_references_in_data_are_decoded() {
        let doc = r#"<VTKFile>
  <ImageData WholeExtent="0 1 0 1 0 1" Origin="0 0 0" Spacing="1 1 1">
    <FieldData>
      <DataArray type="String" Name="note" format="ascii">&#72;&#x32;O &amp; salt</DataArray>
    </FieldData>
    <CellData><DataArray Name="e" format="ascii">5</DataArray></CellData>
  </ImageData>
</VTKFile>"#;
        let (_, meta) = read_str(doc).unwrap();
        assert_eq!(meta.field_data.get("note"), Some("H2O & salt"));
    }

    #[test]
    fn unclosed_element_is_a_format_error() {
        let doc = r#"<VTKFile><ImageData WholeExtent="0 1 0 1 0 1" Origin="0 0 0" Spacing="1 1 1">
<CellData><DataArray Name="e" format="ascii">1</DataArray></CellData>"#;
        assert!(matches!(read_str(doc), Err(VtiError::Format(_))));
    }

    #[test]
    fn format_significant_matches_printf_g() {
        assert_eq!(format_significant(2.0, 9), "2");
        assert_eq!(format_significant(0.1, 9), "0.1");
        assert_eq!(format_significant(1.0 / 3.0, 9), "0.333333333");
        assert_eq!(format_significant(-10.0, 9), "-10");
        assert_eq!(format_significant(2.5e-7, 9), "2.5e-07");
        assert_eq!(format_significant(1.0e12, 9), "1e+12");
        assert_eq!(format_significant(123456789.0, 9), "123456789");
        assert_eq!(format_significant(1234567890.0, 9), "1.23456789e+09");
        assert_eq!(format_significant(0.0001, 9), "0.0001");
        assert_eq!(format_significant(f64::INFINITY, 9), "inf");
    }

    #[test]
    fn single_precision_text_round_trips_exactly() {
        for v in [0.1f32, 1.0e-30, 3.4028235e38, 16777217.0, 1.17549435e-38] {
            let text = format_significant(v as f64, 9);
            assert_eq!(text.parse::<f64>().unwrap() as f32, v, "{text}");
        }
    }
}
