//! Control Routes
//!
//! - GET /api/v1/controls - Bounds and defaults for the dashboard widgets

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{ControlsResponse, NationalityOption};
use crate::api::state::AppState;
use crate::pipeline::NationalityGroup;

/// GET /api/v1/controls
pub async fn controls(State(state): State<Arc<AppState>>) -> Json<ControlsResponse> {
    let dash = &state.dashboard;

    Json(ControlsResponse {
        range_min: dash.range_min,
        range_max: dash.range_max,
        default_low: dash.default_low,
        default_high: dash.default_high,
        show_raw_data: false,
        nationality_options: NationalityGroup::all()
            .iter()
            .map(|g| NationalityOption {
                value: *g,
                label: g.label().to_string(),
            })
            .collect(),
        top_n: dash.top_n,
    })
}
