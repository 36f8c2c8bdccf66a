//! Column mapping
//!
//! Source headers are lower-cased, then renamed through a declared
//! `{source_name -> canonical_name}` table. The loader only ever addresses
//! columns by their canonical names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{DataSourceError, PipelineResult};

/// Canonical column names the loader requires
pub const LOCATION: &str = "location";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const GENDER: &str = "gender";
pub const NATIONALITY: &str = "nationality";

/// Declared renames applied after lower-casing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    renames: BTreeMap<String, String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::new().rename("cluster_local", LOCATION)
    }
}

impl ColumnMapping {
    /// Mapping with no renames (lower-casing only)
    pub fn new() -> Self {
        Self {
            renames: BTreeMap::new(),
        }
    }

    /// Builder method: add a rename
    pub fn rename(mut self, source: &str, canonical: &str) -> Self {
        self.renames
            .insert(source.to_lowercase(), canonical.to_string());
        self
    }

    /// Canonical name for a raw header cell
    pub fn canonical_name(&self, raw: &str) -> String {
        let lower = raw.trim().to_lowercase();
        match self.renames.get(&lower) {
            Some(canonical) => canonical.clone(),
            None => lower,
        }
    }

    /// Canonical header row, in source order
    pub fn canonical_headers(&self, headers: &csv::StringRecord) -> Vec<String> {
        headers.iter().map(|h| self.canonical_name(h)).collect()
    }

    /// Locate the required columns in a header row
    pub fn resolve(&self, headers: &csv::StringRecord) -> PipelineResult<ColumnIndex> {
        let canonical = self.canonical_headers(headers);
        let find = |name: &str| {
            canonical
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataSourceError::MissingColumn(name.to_string()))
        };

        Ok(ColumnIndex {
            location: find(LOCATION)?,
            latitude: find(LATITUDE)?,
            longitude: find(LONGITUDE)?,
            gender: find(GENDER)?,
            nationality: find(NATIONALITY)?,
        })
    }
}

/// Positions of the required columns within a source row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub location: usize,
    pub latitude: usize,
    pub longitude: usize,
    pub gender: usize,
    pub nationality: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cells: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(cells.to_vec())
    }

    #[test]
    fn test_default_mapping_renames_cluster() {
        let mapping = ColumnMapping::default();
        assert_eq!(mapping.canonical_name("Cluster_Local"), "location");
        assert_eq!(mapping.canonical_name("Latitude"), "latitude");
        assert_eq!(mapping.canonical_name("Age"), "age");
    }

    #[test]
    fn test_resolve_columns() {
        let mapping = ColumnMapping::default();
        let idx = mapping
            .resolve(&headers(&[
                "Case", "Gender", "Nationality", "Cluster_local", "Latitude", "Longitude",
            ]))
            .unwrap();

        assert_eq!(idx.gender, 1);
        assert_eq!(idx.nationality, 2);
        assert_eq!(idx.location, 3);
        assert_eq!(idx.latitude, 4);
        assert_eq!(idx.longitude, 5);
    }

    #[test]
    fn test_resolve_missing_column() {
        let mapping = ColumnMapping::default();
        let err = mapping
            .resolve(&headers(&["cluster_local", "latitude", "gender", "nationality"]))
            .unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(ref c) if c == "longitude"));
    }

    #[test]
    fn test_custom_rename() {
        let mapping = ColumnMapping::new().rename("Place", "location");
        let idx = mapping
            .resolve(&headers(&["place", "lat", "latitude", "longitude", "gender", "nationality"]))
            .unwrap();
        assert_eq!(idx.location, 0);
        assert_eq!(idx.latitude, 2);
    }

    #[test]
    fn test_mapping_from_toml_table() {
        let mapping: ColumnMapping = toml::from_str("cluster_local = \"location\"").unwrap();
        assert_eq!(mapping, ColumnMapping::default());
    }
}
