//! Nationality Routes
//!
//! - GET /api/v1/nationality - Top locations for locals or foreigners

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{NationalityParams, NationalityResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::pipeline::NationalityGroup;

/// GET /api/v1/nationality
///
/// Most frequent locations within the chosen nationality group.
/// An empty partition returns an empty table.
pub async fn top_locations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NationalityParams>,
) -> ApiResult<Json<NationalityResponse>> {
    let group = match params.group.as_deref() {
        None => NationalityGroup::Local,
        Some(s) => s.parse::<NationalityGroup>().map_err(ApiError::Validation)?,
    };
    let limit = params.limit.unwrap_or(state.dashboard.top_n);

    let dataset = state.dataset().await?;

    Ok(Json(NationalityResponse {
        group,
        label: group.label().to_string(),
        rows: dataset.top_locations(group, limit),
    }))
}
