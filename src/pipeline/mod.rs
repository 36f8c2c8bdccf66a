//! Case data pipeline
//!
//! Load → clean → aggregate → join, plus the filtered views the dashboard
//! asks for on every interaction.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  CSV text  ┌────────────┐  CaseRecords  ┌─────────────┐
//! │  CaseSource  │ ─────────▶ │ CaseLoader │ ────────────▶ │ CaseDataset │
//! │ (HTTP/file)  │            │ (cleaning) │               │ anchors+view│
//! └──────────────┘            └────────────┘               └──────┬──────┘
//!                                                                 │
//!                                         DatasetCache (max_rows) ┘
//! ```

pub mod aggregate;
pub mod cache;
pub mod columns;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod source;
pub mod types;

pub use aggregate::{
    build_location_anchors, build_location_view, centroid, density_points,
    filter_by_count_range, filter_records_by_locations, gender_breakdown, location_frequencies,
    top_locations_by_nationality, DEFAULT_TOP_N,
};
pub use cache::DatasetCache;
pub use columns::{ColumnIndex, ColumnMapping};
pub use dataset::CaseDataset;
pub use error::{DataSourceError, PipelineResult};
pub use loader::{CaseLoader, LoadOutcome, LoadReport, DEFAULT_MAX_ROWS};
pub use source::{CaseSource, FileSource, HttpSource, InlineSource, DEFAULT_DATA_URL};
pub use types::{
    CaseRecord, Centroid, CountRange, DensityPoint, Gender, GenderCount, LocationAnchor,
    LocationCount, LocationView, LocationViewRow, NationalityGroup, LOCAL_NATIONALITY,
};
