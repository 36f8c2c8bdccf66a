//! Pipeline error types
//!
//! Every failure that aborts a load cycle is a `DataSourceError`.
//! Missing coordinates and malformed rows are not errors; they are
//! filtered out and counted in the load report.

use thiserror::Error;

/// Errors that abort a dataset load
#[derive(Error, Debug)]
pub enum DataSourceError {
    /// Network request to the remote CSV failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Remote server answered with a non-success status
    #[error("Source returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Local source file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV header could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required canonical column is absent after mapping
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Load parameters rejected before fetching
    #[error("Invalid load parameters: {0}")]
    InvalidParameters(String),
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, DataSourceError>;
