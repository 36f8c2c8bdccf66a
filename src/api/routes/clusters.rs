//! Cluster Routes
//!
//! Count-range views of the location table.
//!
//! - GET /api/v1/clusters - Locations with a case count inside the range
//! - GET /api/v1/clusters/gender - Gender histogram for those locations
//! - GET /api/v1/clusters/raw - Raw-data table for the range

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ClustersResponse, GenderChartResponse, RangeParams, RawDataResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::config::DashboardConfig;
use crate::pipeline::CountRange;

/// Shown in place of the map when no location matches
pub const NO_RESULTS_MESSAGE: &str =
    "Based on the loaded dataset, there are no total number of people in this range.";

/// GET /api/v1/clusters
///
/// Map markers for every location whose count is inside the range.
pub async fn list_clusters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<ClustersResponse>> {
    let range = resolve_range(&params, &state.dashboard)?;
    let dataset = state.dataset().await?;

    let locations = dataset.locations_in_range(range);
    let empty = locations.is_empty();

    tracing::debug!(low = range.low, high = range.high, matches = locations.len(), "Clusters in range");

    Ok(Json(ClustersResponse {
        range,
        total: locations.len(),
        locations,
        empty,
        message: empty.then(|| NO_RESULTS_MESSAGE.to_string()),
    }))
}

/// GET /api/v1/clusters/gender
///
/// Histogram of gender over the records of the selected locations.
pub async fn gender_chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<GenderChartResponse>> {
    let range = resolve_range(&params, &state.dashboard)?;
    let dataset = state.dataset().await?;

    let bars = dataset.gender_breakdown(range);
    let total = bars.iter().map(|b| b.count).sum();

    Ok(Json(GenderChartResponse {
        title: format!(
            "Total number of infected persons between {} and {} based on gender",
            range.low, range.high
        ),
        x_axis: "Gender".to_string(),
        y_axis: "Number of Infected Persons".to_string(),
        range,
        empty: bars.is_empty(),
        bars,
        total,
    }))
}

/// GET /api/v1/clusters/raw
///
/// Table behind the "show raw data" toggle.
pub async fn raw_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<RawDataResponse>> {
    let range = resolve_range(&params, &state.dashboard)?;
    let dataset = state.dataset().await?;

    Ok(Json(RawDataResponse {
        subtitle: format!(
            "Raw data by total number of infected persons between {} and {}",
            range.low, range.high
        ),
        range,
        columns: ["location", "latitude", "longitude", "numbers"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows: dataset.locations_in_range(range),
    }))
}

/// Fill missing bounds from the control default and check them against its limits
fn resolve_range(params: &RangeParams, dashboard: &DashboardConfig) -> ApiResult<CountRange> {
    let low = params.low.unwrap_or(dashboard.default_low);
    let high = params.high.unwrap_or(dashboard.default_high);

    let range = CountRange::new(low, high).ok_or_else(|| {
        ApiError::Validation(format!("low ({}) must not exceed high ({})", low, high))
    })?;

    if !dashboard.allows(range) {
        return Err(ApiError::Validation(format!(
            "range must lie within [{}, {}]",
            dashboard.range_min, dashboard.range_max
        )));
    }

    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range_defaults() {
        let dash = DashboardConfig::default();
        let range = resolve_range(&RangeParams::default(), &dash).unwrap();
        assert_eq!(range, CountRange::new(1, 50).unwrap());

        let params = RangeParams {
            low: Some(10),
            high: None,
        };
        assert_eq!(resolve_range(&params, &dash).unwrap().low, 10);
    }

    #[test]
    fn test_resolve_range_rejects_inverted() {
        let params = RangeParams {
            low: Some(20),
            high: Some(10),
        };
        assert!(matches!(
            resolve_range(&params, &DashboardConfig::default()),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_resolve_range_rejects_out_of_bounds() {
        let params = RangeParams {
            low: Some(0),
            high: Some(500),
        };
        assert!(resolve_range(&params, &DashboardConfig::default()).is_err());
    }
}
