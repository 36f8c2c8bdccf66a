//! sgcovid REST API
//!
//! HTTP API layer built with Axum. Each endpoint feeds one dashboard widget.
//!
//! # Endpoints
//!
//! ## Clusters
//! - `GET /api/v1/clusters?low=&high=` - Map markers for locations in the count range
//! - `GET /api/v1/clusters/gender?low=&high=` - Gender histogram for those locations
//! - `GET /api/v1/clusters/raw?low=&high=` - Raw-data table for the range
//!
//! ## Nationality
//! - `GET /api/v1/nationality?group=&limit=` - Top locations for locals or foreigners
//!
//! ## Density
//! - `GET /api/v1/density` - Hexagon layer points and initial view
//!
//! ## Controls
//! - `GET /api/v1/controls` - Control bounds and defaults
//!
//! ## Dataset
//! - `POST /api/v1/reload` - Invalidate and reload the cached dataset
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use sgcovid::api::{serve, AppState};
//! use sgcovid::config::Config;
//! use sgcovid::pipeline::DatasetCache;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!     let cache = Arc::new(DatasetCache::new(config.source.build_source()?));
//!     let state = AppState::new(cache, config.source.max_rows, config.dashboard.clone());
//!     serve(state, &config.api).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use crate::config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Cluster routes
        .route("/clusters", get(routes::clusters::list_clusters))
        .route("/clusters/gender", get(routes::clusters::gender_chart))
        .route("/clusters/raw", get(routes::clusters::raw_data))
        // Nationality routes
        .route("/nationality", get(routes::nationality::top_locations))
        // Density routes
        .route("/density", get(routes::density::density_map))
        // Control routes
        .route("/controls", get(routes::controls::controls))
        // Dataset routes
        .route("/reload", post(routes::reload::reload_dataset));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("sgcovid API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("sgcovid API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
