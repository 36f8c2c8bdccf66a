//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::pipeline::{
    Centroid, CountRange, DensityPoint, GenderCount, LoadReport, LocationCount, LocationViewRow,
    NationalityGroup,
};

// ============================================
// CLUSTER DTOs
// ============================================

/// Count-range query parameters. Missing bounds fall back to the control default.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    #[serde(default)]
    pub low: Option<u32>,
    #[serde(default)]
    pub high: Option<u32>,
}

/// Locations whose case count is inside the range (map markers)
#[derive(Debug, Serialize)]
pub struct ClustersResponse {
    pub range: CountRange,
    pub locations: Vec<LocationViewRow>,
    pub total: usize,
    /// True when no location matched
    pub empty: bool,
    /// Explanation to show instead of an empty map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Gender histogram for the selected locations
#[derive(Debug, Serialize)]
pub struct GenderChartResponse {
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub range: CountRange,
    pub bars: Vec<GenderCount>,
    /// Number of records behind the bars
    pub total: u32,
    pub empty: bool,
}

/// Raw-data table for the selected range
#[derive(Debug, Serialize)]
pub struct RawDataResponse {
    pub subtitle: String,
    pub range: CountRange,
    pub columns: Vec<String>,
    pub rows: Vec<LocationViewRow>,
}

// ============================================
// NATIONALITY DTOs
// ============================================

/// Nationality query parameters
#[derive(Debug, Default, Deserialize)]
pub struct NationalityParams {
    /// singaporean | foreigners (defaults to singaporean)
    #[serde(default)]
    pub group: Option<String>,
    /// Number of rows (defaults to the configured top N)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Top locations for one nationality group
#[derive(Debug, Serialize)]
pub struct NationalityResponse {
    pub group: NationalityGroup,
    pub label: String,
    pub rows: Vec<LocationCount>,
}

// ============================================
// DENSITY DTOs
// ============================================

/// Initial camera of the density map
#[derive(Debug, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u32,
    pub pitch: u32,
}

/// Hexagon layer parameters
#[derive(Debug, Serialize)]
pub struct HexagonLayer {
    pub radius: u32,
    pub elevation_scale: u32,
    pub elevation_range: [u32; 2],
    pub extruded: bool,
    pub color: [u8; 4],
}

impl Default for HexagonLayer {
    fn default() -> Self {
        Self {
            radius: 300,
            elevation_scale: 6,
            elevation_range: [0, 1000],
            extruded: true,
            color: [200, 30, 0, 160],
        }
    }
}

/// Points, midpoint and layer settings for the density map
#[derive(Debug, Serialize)]
pub struct DensityResponse {
    pub points: Vec<DensityPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midpoint: Option<Centroid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_state: Option<ViewState>,
    pub layer: HexagonLayer,
}

// ============================================
// CONTROL DTOs
// ============================================

/// One option of the nationality selector
#[derive(Debug, Serialize)]
pub struct NationalityOption {
    pub value: NationalityGroup,
    pub label: String,
}

/// Bounds and defaults of the dashboard controls
#[derive(Debug, Serialize)]
pub struct ControlsResponse {
    pub range_min: u32,
    pub range_max: u32,
    pub default_low: u32,
    pub default_high: u32,
    pub show_raw_data: bool,
    pub nationality_options: Vec<NationalityOption>,
    pub top_n: usize,
}

// ============================================
// RELOAD DTOs
// ============================================

/// Result of an explicit reload
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: String,
    pub max_rows: usize,
    pub locations: usize,
    pub report: LoadReport,
    /// ISO 8601
    pub loaded_at: String,
    pub duration_ms: u64,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, starting
    pub status: String,
    /// Dataset status: loaded, not_loaded
    pub dataset: String,
    pub source: String,
    pub cached_row_caps: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
