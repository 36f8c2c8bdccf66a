//! Core data types for the case pipeline
//!
//! - `CaseRecord`: one cleaned row of the source CSV
//! - `LocationAnchor`: first-seen coordinates of a location
//! - `LocationCount` / `LocationViewRow`: per-location case counts
//! - `CountRange`, `NationalityGroup`: filter inputs
//! - `GenderCount`, `Centroid`, `DensityPoint`: chart and map inputs

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Nationality value treated as local. Matched exactly, with no case folding.
pub const LOCAL_NATIONALITY: &str = "singapore";

/// A single case record after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Cluster name (renamed from `cluster_local`)
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub gender: Gender,
    /// Free text, kept exactly as it appears in the source
    pub nationality: String,
}

impl CaseRecord {
    pub fn new(
        location: impl Into<String>,
        latitude: f64,
        longitude: f64,
        gender: impl AsRef<str>,
        nationality: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            latitude,
            longitude,
            gender: Gender::normalize(gender.as_ref()),
            nationality: nationality.into(),
        }
    }
}

/// Gender of a case
///
/// Single-letter codes `m`/`f` normalize to `Male`/`Female`. Anything else
/// is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl Gender {
    /// Normalize a raw gender cell
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "m" | "male" => Gender::Male,
            "f" | "female" => Gender::Female,
            other => Gender::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other(s) => s,
        }
    }
}

impl From<String> for Gender {
    fn from(s: String) -> Self {
        Gender::normalize(&s)
    }
}

impl From<Gender> for String {
    fn from(g: Gender) -> Self {
        g.as_str().to_string()
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First-seen coordinates recorded for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationAnchor {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Number of records carrying a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub numbers: u32,
}

/// One row of the location view: `[location, latitude, longitude, numbers]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationViewRow {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub numbers: u32,
}

/// Per-location counts joined with anchor coordinates
pub type LocationView = Vec<LocationViewRow>;

/// Inclusive bounds on a per-location case count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub low: u32,
    pub high: u32,
}

impl CountRange {
    /// Returns `None` when `low > high`
    pub fn new(low: u32, high: u32) -> Option<Self> {
        (low <= high).then_some(Self { low, high })
    }

    pub fn contains(&self, numbers: u32) -> bool {
        self.low <= numbers && numbers <= self.high
    }
}

impl std::fmt::Display for CountRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "between {} and {}", self.low, self.high)
    }
}

/// Partition of records by nationality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NationalityGroup {
    /// `nationality == "singapore"`
    Local,
    /// Every other nationality value
    Foreign,
}

impl NationalityGroup {
    pub fn all() -> &'static [NationalityGroup] {
        &[NationalityGroup::Local, NationalityGroup::Foreign]
    }

    /// Selector label shown to users.
    ///
    /// "Foreingners" is the published dashboard wording; changing it is a
    /// content decision.
    pub fn label(&self) -> &'static str {
        match self {
            NationalityGroup::Local => "Singaporean",
            NationalityGroup::Foreign => "Foreingners",
        }
    }

    /// Whether a raw nationality value falls in this group
    pub fn matches(&self, nationality: &str) -> bool {
        let local = nationality == LOCAL_NATIONALITY;
        match self {
            NationalityGroup::Local => local,
            NationalityGroup::Foreign => !local,
        }
    }
}

impl FromStr for NationalityGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "singaporean" | "singaporeans" => Ok(NationalityGroup::Local),
            "foreign" | "foreigner" | "foreigners" | "foreingners" => {
                Ok(NationalityGroup::Foreign)
            }
            _ => Err(format!(
                "Invalid nationality group: {}. Use singaporean or foreigners",
                s
            )),
        }
    }
}

impl std::fmt::Display for NationalityGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Histogram bucket for the gender chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderCount {
    pub gender: Gender,
    pub count: u32,
}

/// Mean of all anchor coordinates, used as the initial map view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

/// Raw `[location, latitude, longitude]` triple for the density layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&CaseRecord> for DensityPoint {
    fn from(r: &CaseRecord) -> Self {
        Self {
            location: r.location.clone(),
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}
