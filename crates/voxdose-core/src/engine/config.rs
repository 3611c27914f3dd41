use crate::core::models::field::{FieldMetadata, format_full_precision};
use crate::core::models::grid::GridGeometry;
use phf::phf_ordered_map;
use thiserror::Error;

pub const MATERIAL_KEY: &str = "objects[0].material";
pub const G_VALUES_KEY: &str = "objects[0].material.radiolysis.g_values_molecules_per_100eV";

/// Radiolytic yields of neutral-pH bulk water, molecules per 100 eV absorbed.
static BULK_WATER_G_VALUES: phf::OrderedMap<&'static str, f64> = phf_ordered_map! {
    "OH" => 2.8,
    "e_aq" => 2.7,
    "H" => 0.6,
    "H2" => 0.45,
    "H2O2" => 0.7,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to parse configuration '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Species → G-value (molecules / 100 eV), iterated in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct GValueTable {
    entries: Vec<(String, f64)>,
}

impl GValueTable {
    pub fn new(entries: Vec<(String, f64)>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::invalid(
                G_VALUES_KEY,
                "must be a non-empty mapping of species to G-values",
            ));
        }
        for (i, (species, g)) in entries.iter().enumerate() {
            if species.trim().is_empty() || species.contains(['/', '\\']) {
                return Err(ConfigError::invalid(
                    G_VALUES_KEY,
                    format!("'{}' is not a usable species name", species),
                ));
            }
            if !g.is_finite() || *g < 0.0 {
                return Err(ConfigError::invalid(
                    format!("{}.{}", G_VALUES_KEY, species),
                    format!("G-value must be a finite number >= 0 (got {})", g),
                ));
            }
            if entries[..i].iter().any(|(s, _)| s == species) {
                return Err(ConfigError::invalid(
                    G_VALUES_KEY,
                    format!("species '{}' is listed twice", species),
                ));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in table used for simulations assumed to be aqueous.
    pub fn bulk_water() -> Self {
        Self {
            entries: BULK_WATER_G_VALUES
                .entries()
                .map(|(species, g)| (species.to_string(), *g))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(s, g)| (s.as_str(), *g))
    }

    pub fn get(&self, species: &str) -> Option<f64> {
        self.iter().find(|(s, _)| *s == species).map(|(_, g)| g)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `OH:2.8;e_aq:2.7;...` as recorded in output metadata.
    pub fn describe(&self) -> String {
        self.iter()
            .map(|(s, g)| format!("{}:{}", s, format_full_precision(g)))
            .collect::<Vec<_>>()
            .join(";")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadiolysisSpec {
    pub g_values: Option<GValueTable>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSpec {
    pub formula: String,
    pub density_g_cm3: f64,
    pub heat_capacity_j_kgk: Option<f64>,
    pub radiolysis: Option<RadiolysisSpec>,
}

impl MaterialSpec {
    pub fn require_heat_capacity(&self) -> Result<f64, ConfigError> {
        self.heat_capacity_j_kgk
            .ok_or_else(|| ConfigError::MissingKey(format!("{}.cp_J_kgK", MATERIAL_KEY)))
    }

    pub fn require_g_values(&self) -> Result<&GValueTable, ConfigError> {
        self.radiolysis
            .as_ref()
            .and_then(|r| r.g_values.as_ref())
            .ok_or_else(|| ConfigError::MissingKey(G_VALUES_KEY.to_string()))
    }

    pub fn radiolysis_source(&self) -> Option<&str> {
        self.radiolysis.as_ref().and_then(|r| r.source.as_deref())
    }

    pub fn provenance(&self) -> FieldMetadata {
        FieldMetadata::new()
            .with_text("material_formula", self.formula.clone())
            .with_number("material_density_g_cm3", self.density_g_cm3)
    }
}

/// Detector geometry; consumed only by rendering collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorSpec {
    pub pixels: [u32; 2],
    pub pixel_size_mm: [f64; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeamSpec {
    pub mono_energy_kev: f64,
    pub photon_flux_per_s: f64,
    pub exposure_time_s: f64,
    pub detector: Option<DetectorSpec>,
}

impl BeamSpec {
    pub const DEFAULT_EXPOSURE_TIME_S: f64 = 1.0;

    /// Physical photon count implied by flux and exposure.
    pub fn photons(&self) -> f64 {
        self.photon_flux_per_s * self.exposure_time_s
    }

    /// Factor rescaling a result of `simulated_events` primaries to the physical photon count.
    pub fn event_scale(&self, simulated_events: f64) -> Result<f64, ConfigError> {
        if !simulated_events.is_finite() || simulated_events <= 0.0 {
            return Err(ConfigError::invalid(
                "simulated_events",
                format!("must be a finite number > 0 (got {})", simulated_events),
            ));
        }
        Ok(self.photons() / simulated_events)
    }

    pub fn provenance(&self) -> FieldMetadata {
        FieldMetadata::new()
            .with_number("beam_mono_energy_keV", self.mono_energy_kev)
            .with_number("beam_photon_flux_per_s", self.photon_flux_per_s)
            .with_number("beam_exposure_time_s", self.exposure_time_s)
    }
}

/// Geometry of the tally grid used by the simulation: a cube of `counts` cells spanning
/// `[-half_size_mm, +half_size_mm]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGridSpec {
    pub counts: [usize; 3],
    pub half_size_mm: f64,
}

impl Default for VoxelGridSpec {
    fn default() -> Self {
        Self {
            counts: [100, 100, 100],
            half_size_mm: 10.0,
        }
    }
}

impl VoxelGridSpec {
    pub fn geometry(&self) -> Result<GridGeometry, ConfigError> {
        GridGeometry::centered_cube(self.counts, self.half_size_mm)
            .map_err(|e| ConfigError::invalid("voxel_grid", e.to_string()))
    }
}
