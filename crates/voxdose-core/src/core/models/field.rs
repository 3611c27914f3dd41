use super::grid::VoxelGrid;

/// Ordered string-keyed provenance attached to a written field.
///
/// Values are stringified on insertion; numbers keep full round-trip precision.
/// Re-inserting a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMetadata {
    entries: Vec<(String, String)>,
}

impl FieldMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn insert_number(&mut self, key: impl Into<String>, value: f64) {
        self.insert_text(key, format_full_precision(value));
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_text(key, value);
        self
    }

    pub fn with_number(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert_number(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends every entry of `other`, replacing keys that already exist.
    pub fn extend(&mut self, other: &FieldMetadata) {
        for (k, v) in other.iter() {
            self.insert_text(k, v);
        }
    }
}

/// Shortest representation that parses back to the same `f64`.
pub fn format_full_precision(value: f64) -> String {
    let magnitude = value.abs();
    if value != 0.0 && value.is_finite() && !(1e-4..1e16).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

/// A terminal artifact: a grid, the name it is published under and its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedField {
    pub name: String,
    pub grid: VoxelGrid,
    pub metadata: FieldMetadata,
}

impl DerivedField {
    pub fn new(name: impl Into<String>, grid: VoxelGrid, metadata: FieldMetadata) -> Self {
        Self {
            name: name.into(),
            grid,
            metadata,
        }
    }

    /// Suffix appended to the caller's output prefix, e.g. `_dose_Gy`.
    pub fn file_suffix(&self) -> String {
        format!("_{}", self.name)
    }
}
