//! # sgcovid
//!
//! Singapore Covid-19 cluster dashboard backend. Loads a CSV of case
//! records, derives per-location counts, gender and nationality breakdowns,
//! and serves them to a map/chart front-end over HTTP.
//!
//! ## Modules
//!
//! - [`pipeline`]: Load, clean and aggregate case records
//! - [`config`]: TOML configuration with environment overrides
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sgcovid::pipeline::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(HttpSource::new(DEFAULT_DATA_URL)?);
//!     let cache = DatasetCache::new(source);
//!
//!     let dataset = cache.get_or_load(DEFAULT_MAX_ROWS).await?;
//!
//!     let range = CountRange::new(1, 50).unwrap();
//!     for row in dataset.locations_in_range(range) {
//!         println!("{}: {} cases", row.location, row.numbers);
//!     }
//!
//!     let top = dataset.top_locations(NationalityGroup::Local, DEFAULT_TOP_N);
//!     println!("Top local clusters: {:?}", top);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod pipeline;

pub use pipeline::{
    CaseDataset, CaseLoader, CaseRecord, CaseSource, ColumnMapping, CountRange, DataSourceError,
    DatasetCache, FileSource, Gender, HttpSource, InlineSource, LocationAnchor, LocationCount,
    LocationViewRow, NationalityGroup, PipelineResult,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{
    generate_default_config, ApiConfig, Config, ConfigError, DashboardConfig, LoggingConfig,
    SourceConfig,
};
