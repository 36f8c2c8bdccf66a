//! Density Routes
//!
//! - GET /api/v1/density - Points and camera for the hexagon density map

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{DensityResponse, HexagonLayer, ViewState};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

const INITIAL_ZOOM: u32 = 11;
const INITIAL_PITCH: u32 = 50;

/// GET /api/v1/density
///
/// One point per record, centred on the mean of the location anchors.
pub async fn density_map(State(state): State<Arc<AppState>>) -> ApiResult<Json<DensityResponse>> {
    let dataset = state.dataset().await?;
    let midpoint = dataset.centroid();

    Ok(Json(DensityResponse {
        points: dataset.density_points(),
        view_state: midpoint.map(|c| ViewState {
            latitude: c.latitude,
            longitude: c.longitude,
            zoom: INITIAL_ZOOM,
            pitch: INITIAL_PITCH,
        }),
        midpoint,
        layer: HexagonLayer::default(),
    }))
}
