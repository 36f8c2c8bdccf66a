//! Reload Routes
//!
//! - POST /api/v1/reload - Drop the cached dataset and fetch it again

use axum::{extract::State, Json};
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::ReloadResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// POST /api/v1/reload
///
/// A failed fetch leaves the cache empty for this row cap; the next
/// request will try the source again.
pub async fn reload_dataset(State(state): State<Arc<AppState>>) -> ApiResult<Json<ReloadResponse>> {
    let start = Instant::now();

    tracing::info!(max_rows = state.max_rows, "Reloading dataset");
    let dataset = state.cache.reload(state.max_rows).await?;

    Ok(Json(ReloadResponse {
        status: "reloaded".to_string(),
        max_rows: state.max_rows,
        locations: dataset.anchors().len(),
        report: dataset.report().clone(),
        loaded_at: dataset.loaded_at().to_rfc3339(),
        duration_ms: start.elapsed().as_millis() as u64,
    }))
}
