use nalgebra::Point3;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepositError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid deposit on data row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct DepositRecord {
    x_mm: f64,
    y_mm: f64,
    z_mm: f64,
    #[serde(rename = "edep_keV")]
    edep_kev: f64,
}

/// One energy-deposition step: where it happened and how much energy it left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDeposit {
    pub position_mm: Point3<f64>,
    pub edep_kev: f64,
}

/// Reads a `x_mm,y_mm,z_mm,edep_keV` table. Extra columns are ignored.
pub fn read_from_path(path: &Path) -> Result<Vec<StepDeposit>, DepositError> {
    let display = path.to_string_lossy().to_string();
    let reader = csv::Reader::from_path(path).map_err(|e| DepositError::Csv {
        path: display.clone(),
        source: e,
    })?;
    collect(reader, &display)
}

pub fn read_from(reader: impl Read) -> Result<Vec<StepDeposit>, DepositError> {
    collect(csv::Reader::from_reader(reader), "<reader>")
}

fn collect<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &str,
) -> Result<Vec<StepDeposit>, DepositError> {
    let mut deposits = Vec::new();
    for (row, result) in reader.deserialize::<DepositRecord>().enumerate() {
        let record = result.map_err(|e| DepositError::Csv {
            path: origin.to_string(),
            source: e,
        })?;
        let values = [record.x_mm, record.y_mm, record.z_mm, record.edep_kev];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DepositError::InvalidRow {
                row: row + 1,
                reason: "all columns must be finite numbers".into(),
            });
        }
        deposits.push(StepDeposit {
            position_mm: Point3::new(record.x_mm, record.y_mm, record.z_mm),
            edep_kev: record.edep_kev,
        });
    }
    Ok(deposits)
}
