//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::api::error::ApiResult;
use crate::config::DashboardConfig;
use crate::pipeline::{CaseDataset, DatasetCache};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded datasets keyed by row cap
    pub cache: Arc<DatasetCache>,
    /// Row cap the dashboard loads with
    pub max_rows: usize,
    /// Control bounds and defaults
    pub dashboard: Arc<DashboardConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(cache: Arc<DatasetCache>, max_rows: usize, dashboard: DashboardConfig) -> Self {
        Self {
            cache,
            max_rows,
            dashboard: Arc::new(dashboard),
            start_time: Instant::now(),
        }
    }

    /// Dataset for the configured row cap, loading it on first use
    pub async fn dataset(&self) -> ApiResult<Arc<CaseDataset>> {
        Ok(self.cache.get_or_load(self.max_rows).await?)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
