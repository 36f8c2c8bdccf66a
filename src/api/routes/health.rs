//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (dataset can be served)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Loads the dataset if it is not cached yet; 503 if that fails.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.dataset().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET /health
///
/// Full health status. Never triggers a load.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cached = state.cache.get(state.max_rows).await;

    let (status, dataset) = if cached.is_some() {
        ("healthy", "loaded")
    } else {
        ("starting", "not_loaded")
    };

    Json(HealthResponse {
        status: status.to_string(),
        dataset: dataset.to_string(),
        source: state.cache.source_description(),
        cached_row_caps: state.cache.cached_keys().await,
        records: cached.map(|d| d.records().len()),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
