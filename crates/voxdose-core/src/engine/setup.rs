use super::config::{
    BeamSpec, ConfigError, DetectorSpec, G_VALUES_KEY, GValueTable, MATERIAL_KEY, MaterialSpec,
    RadiolysisSpec, VoxelGridSpec,
};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
struct SetupRecord {
    objects: Option<Vec<ObjectRecord>>,
    beam: Option<BeamRecord>,
    voxel_grid: Option<VoxelGridRecord>,
}

#[derive(Deserialize, Debug, Default)]
struct ObjectRecord {
    id: Option<String>,
    material: Option<MaterialRecord>,
}

#[derive(Deserialize, Debug, Default)]
struct MaterialRecord {
    formula: Option<String>,
    density_g_cm3: Option<f64>,
    #[serde(rename = "cp_J_kgK")]
    cp_j_kgk: Option<f64>,
    radiolysis: Option<RadiolysisRecord>,
}

#[derive(Deserialize, Debug, Default)]
struct RadiolysisRecord {
    #[serde(rename = "g_values_molecules_per_100eV")]
    g_values: Option<serde_json::Value>,
    source: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct BeamRecord {
    #[serde(rename = "mono_energy_keV")]
    mono_energy_kev: Option<f64>,
    photon_flux_per_s: Option<f64>,
    exposure_time_s: Option<f64>,
    detector_pixels: Option<[u32; 2]>,
    detector_pixel_size_mm: Option<[f64; 2]>,
}

#[derive(Deserialize, Debug, Default)]
struct VoxelGridRecord {
    counts: Option<[usize; 3]>,
    half_size_mm: Option<f64>,
}

/// Typed view of the scene setup record.
///
/// Only the first object is used: dose and mass are computed for a single uniform
/// material even when the record lists several objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    pub object_id: Option<String>,
    pub material: MaterialSpec,
    pub beam: Option<BeamSpec>,
    pub voxel_grid: VoxelGridSpec,
}

impl Setup {
    /// Loads a JSON record, or TOML when the extension is `.toml`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading setup record from {:?}", path);
        let display = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: display.clone(),
            source: e,
        })?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let record: SetupRecord = if is_toml {
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?
        };
        Self::from_record(record)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let record: SetupRecord =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse {
                path: "<inline json>".into(),
                message: e.to_string(),
            })?;
        Self::from_record(record)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let record: SetupRecord = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline toml>".into(),
            message: e.to_string(),
        })?;
        Self::from_record(record)
    }

    pub fn require_beam(&self) -> Result<&BeamSpec, ConfigError> {
        self.beam
            .as_ref()
            .ok_or_else(|| ConfigError::MissingKey("beam".into()))
    }

    fn from_record(record: SetupRecord) -> Result<Self, ConfigError> {
        let object = record
            .objects
            .and_then(|objects| objects.into_iter().next())
            .ok_or_else(|| ConfigError::MissingKey("objects[0]".into()))?;
        let material = object
            .material
            .ok_or_else(|| ConfigError::MissingKey(MATERIAL_KEY.into()))?;

        Ok(Self {
            object_id: object.id,
            material: material_spec(material)?,
            beam: record.beam.map(beam_spec).transpose()?,
            voxel_grid: voxel_grid_spec(record.voxel_grid.unwrap_or_default())?,
        })
    }
}

fn material_spec(record: MaterialRecord) -> Result<MaterialSpec, ConfigError> {
    let formula = record
        .formula
        .ok_or_else(|| ConfigError::MissingKey(format!("{}.formula", MATERIAL_KEY)))?;
    let density_key = format!("{}.density_g_cm3", MATERIAL_KEY);
    let density_g_cm3 = record
        .density_g_cm3
        .ok_or_else(|| ConfigError::MissingKey(density_key.clone()))?;
    if !density_g_cm3.is_finite() || density_g_cm3 <= 0.0 {
        return Err(ConfigError::invalid(
            density_key,
            format!("density must be > 0 (got {})", density_g_cm3),
        ));
    }
    if let Some(cp) = record.cp_j_kgk {
        if !cp.is_finite() || cp <= 0.0 {
            return Err(ConfigError::invalid(
                format!("{}.cp_J_kgK", MATERIAL_KEY),
                format!("heat capacity must be > 0 (got {})", cp),
            ));
        }
    }
    let radiolysis = record
        .radiolysis
        .map(|r| -> Result<RadiolysisSpec, ConfigError> {
            Ok(RadiolysisSpec {
                g_values: r.g_values.map(g_value_table).transpose()?,
                source: r.source,
            })
        })
        .transpose()?;

    Ok(MaterialSpec {
        formula,
        density_g_cm3,
        heat_capacity_j_kgk: record.cp_j_kgk,
        radiolysis,
    })
}

fn g_value_table(value: serde_json::Value) -> Result<GValueTable, ConfigError> {
    let serde_json::Value::Object(map) = value else {
        return Err(ConfigError::invalid(
            G_VALUES_KEY,
            "must be a mapping of species to G-values",
        ));
    };
    let entries = map
        .into_iter()
        .map(|(species, g)| {
            let parsed = match &g {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            parsed.map(|g| (species.clone(), g)).ok_or_else(|| {
                ConfigError::invalid(
                    format!("{}.{}", G_VALUES_KEY, species),
                    format!("expected a number, found {}", g),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    GValueTable::new(entries)
}

fn beam_spec(record: BeamRecord) -> Result<BeamSpec, ConfigError> {
    let mono_energy_kev = record
        .mono_energy_kev
        .ok_or_else(|| ConfigError::MissingKey("beam.mono_energy_keV".into()))?;
    if !mono_energy_kev.is_finite() || mono_energy_kev <= 0.0 {
        return Err(ConfigError::invalid(
            "beam.mono_energy_keV",
            format!("must be > 0 (got {})", mono_energy_kev),
        ));
    }
    let photon_flux_per_s = record
        .photon_flux_per_s
        .ok_or_else(|| ConfigError::MissingKey("beam.photon_flux_per_s".into()))?;
    if !photon_flux_per_s.is_finite() || photon_flux_per_s < 0.0 {
        return Err(ConfigError::invalid(
            "beam.photon_flux_per_s",
            format!("must be >= 0 (got {})", photon_flux_per_s),
        ));
    }
    let exposure_time_s = record
        .exposure_time_s
        .unwrap_or(BeamSpec::DEFAULT_EXPOSURE_TIME_S);
    if !exposure_time_s.is_finite() || exposure_time_s < 0.0 {
        return Err(ConfigError::invalid(
            "beam.exposure_time_s",
            format!("must be >= 0 (got {})", exposure_time_s),
        ));
    }
    let detector = match (record.detector_pixels, record.detector_pixel_size_mm) {
        (Some(pixels), Some(pixel_size_mm)) => Some(DetectorSpec {
            pixels,
            pixel_size_mm,
        }),
        _ => None,
    };

    Ok(BeamSpec {
        mono_energy_kev,
        photon_flux_per_s,
        exposure_time_s,
        detector,
    })
}

fn voxel_grid_spec(record: VoxelGridRecord) -> Result<VoxelGridSpec, ConfigError> {
    let defaults = VoxelGridSpec::default();
    let spec = VoxelGridSpec {
        counts: record.counts.unwrap_or(defaults.counts),
        half_size_mm: record.half_size_mm.unwrap_or(defaults.half_size_mm),
    };
    spec.geometry()?;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const SETUP_JSON: &str = r#"{
        "beam": {
            "type": "parallel",
            "mono_energy_keV": 25.0,
            "photon_flux_per_s": 1e10,
            "detector_pixels": [2048, 2048],
            "detector_pixel_size_mm": [0.05, 0.05]
        },
        "objects": [
            {
                "id": "Dragon",
                "mesh_path": "data/dragon.stl",
                "material": {
                    "formula": "Ca10(PO4)6(OH)2",
                    "density_g_cm3": 1.8,
                    "cp_J_kgK": 700,
                    "radiolysis": {
                        "source": "literature",
                        "g_values_molecules_per_100eV": {"OH": 2.8, "H2O2": "0.7", "e_aq": 2.7}
                    }
                }
            },
            {
                "id": "Ignored",
                "material": {"formula": "Pb", "density_g_cm3": 11.3}
            }
        ],
        "voxel_grid": {"counts": [10, 20, 30]}
    }"#;

    #[test]
    fn full_record_is_parsed_into_typed_specs() {
        let setup = Setup::from_json_str(SETUP_JSON).unwrap();
        assert_eq!(setup.object_id.as_deref(), Some("Dragon"));
        assert_eq!(setup.material.formula, "Ca10(PO4)6(OH)2");
        assert_eq!(setup.material.density_g_cm3, 1.8);
        assert_eq!(setup.material.heat_capacity_j_kgk, Some(700.0));
        assert_eq!(setup.material.radiolysis_source(), Some("literature"));

        let beam = setup.require_beam().unwrap();
        assert_eq!(beam.mono_energy_kev, 25.0);
        assert_eq!(beam.exposure_time_s, 1.0);
        assert_eq!(beam.detector.as_ref().unwrap().pixels, [2048, 2048]);

        assert_eq!(setup.voxel_grid.counts, [10, 20, 30]);
        assert_eq!(setup.voxel_grid.half_size_mm, 10.0);
    }

    #[test]
    fn g_values_keep_document_order() {
        let setup = Setup::from_json_str(SETUP_JSON).unwrap();
        let table = setup.material.require_g_values().unwrap();
        let species: Vec<_> = table.iter().map(|(s, _)| s).collect();
        assert_eq!(species, vec!["OH", "H2O2", "e_aq"]);
        assert_eq!(table.get("H2O2"), Some(0.7));
    }

    #[test]
    fn missing_density_names_the_key() {
        let json = r#"{"objects": [{"material": {"formula": "H2O"}}]}"#;
        let err = Setup::from_json_str(json).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingKey(k) if k == "objects[0].material.density_g_cm3")
        );
    }

    #[test]
    fn missing_objects_is_a_config_error() {
        let err = Setup::from_json_str(r#"{"objects": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(k) if k == "objects[0]"));
        let err = Setup::from_json_str("{}").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(k) if k == "objects[0]"));
    }

    #[test]
    fn non_positive_density_is_rejected_eagerly() {
        let json = r#"{"objects": [{"material": {"formula": "H2O", "density_g_cm3": 0}}]}"#;
        let err = Setup::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn non_mapping_g_values_are_rejected() {
        let json = r#"{"objects": [{"material": {"formula": "H2O", "density_g_cm3": 1.0,
            "radiolysis": {"g_values_molecules_per_100eV": [2.8, 2.7]}}}]}"#;
        let err = Setup::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == G_VALUES_KEY));
    }

    #[test]
    fn empty_g_values_are_rejected() {
        let json = r#"{"objects": [{"material": {"formula": "H2O", "density_g_cm3": 1.0,
            "radiolysis": {"g_values_molecules_per_100eV": {}}}}]}"#;
        assert!(matches!(
            Setup::from_json_str(json),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn radiolysis_without_table_fails_only_when_required() {
        let json = r#"{"objects": [{"material": {"formula": "H2O", "density_g_cm3": 1.0,
            "radiolysis": {"source": "none"}}}]}"#;
        let setup = Setup::from_json_str(json).unwrap();
        assert!(matches!(
            setup.material.require_g_values(),
            Err(ConfigError::MissingKey(_))
        ));
    }

    #[test]
    fn beam_without_flux_names_the_key() {
        let json = r#"{"beam": {"mono_energy_keV": 25.0},
            "objects": [{"material": {"formula": "H2O", "density_g_cm3": 1.0}}]}"#;
        let err = Setup::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(k) if k == "beam.photon_flux_per_s"));
    }

    #[test]
    fn absent_beam_is_reported_when_required() {
        let json = r#"{"objects": [{"material": {"formula": "H2O", "density_g_cm3": 1.0}}]}"#;
        let setup = Setup::from_json_str(json).unwrap();
        assert!(matches!(setup.require_beam(), Err(ConfigError::MissingKey(k)) if k == "beam"));
    }

    #[test]
    fn wrongly_typed_value_is_a_parse_error() {
        let json = r#"{"objects": [{"material": {"formula": "H2O", "density_g_cm3": "heavy"}}]}"#;
        assert!(matches!(
            Setup::from_json_str(json),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn toml_records_are_supported() {
        let toml = r#"
[beam]
mono_energy_keV = 30.0
photon_flux_per_s = 5e9
exposure_time_s = 0.5

[[objects]]
id = "Water"

[objects.material]
formula = "H2O"
density_g_cm3 = 1.0
cp_J_kgK = 4184

[objects.material.radiolysis.g_values_molecules_per_100eV]
OH = 2.8
H2 = 0.45
"#;
        let setup = Setup::from_toml_str(toml).unwrap();
        assert_eq!(setup.require_beam().unwrap().exposure_time_s, 0.5);
        assert_eq!(setup.material.heat_capacity_j_kgk, Some(4184.0));
        let species: Vec<_> = setup
            .material
            .require_g_values()
            .unwrap()
            .iter()
            .map(|(s, _)| s.to_string())
            .collect();
        assert_eq!(species, vec!["OH", "H2"]);
    }

    #[test]
    fn load_selects_parser_by_extension() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("setup.json");
        File::create(&json_path)
            .unwrap()
            .write_all(SETUP_JSON.as_bytes())
            .unwrap();
        assert!(Setup::load(&json_path).is_ok());

        let missing = dir.path().join("absent.json");
        assert!(matches!(Setup::load(&missing), Err(ConfigError::Io { .. })));
    }
}
