//! CSV Loader
//!
//! Turns raw case CSV text into cleaned `CaseRecord`s:
//! - reads at most `max_rows` data rows
//! - skips rows that fail to parse
//! - drops rows without usable coordinates
//! - maps column names and normalizes gender codes

use serde::Serialize;

use super::columns::{ColumnIndex, ColumnMapping};
use super::error::{DataSourceError, PipelineResult};
use super::source::CaseSource;
use super::types::CaseRecord;

/// Default row cap used by the dashboard
pub const DEFAULT_MAX_ROWS: usize = 3200;

/// Case CSV loader with a row cap and column mapping
#[derive(Debug, Clone)]
pub struct CaseLoader {
    max_rows: usize,
    mapping: ColumnMapping,
}

/// Counters describing one load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows consumed from the source, including malformed ones
    pub rows_read: usize,
    /// Rows skipped because they could not be parsed
    pub rows_malformed: usize,
    /// Rows dropped for a missing latitude or longitude
    pub rows_missing_coordinates: usize,
    /// Records kept
    pub records: usize,
}

/// Cleaned records plus the counters of the load that produced them
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub records: Vec<CaseRecord>,
    pub report: LoadReport,
}

impl Default for CaseLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROWS)
    }
}

impl CaseLoader {
    pub fn new(max_rows: usize) -> Self {
        Self {
            max_rows,
            mapping: ColumnMapping::default(),
        }
    }

    /// Builder method: replace the column mapping
    pub fn with_mapping(mut self, mapping: ColumnMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Fetch from a source and clean the result
    pub async fn load(&self, source: &dyn CaseSource) -> PipelineResult<LoadOutcome> {
        self.validate()?;

        tracing::info!(source = %source.describe(), max_rows = self.max_rows, "Fetching case data");
        let body = source.fetch().await?;
        let outcome = self.load_str(&body)?;

        tracing::info!(
            rows_read = outcome.report.rows_read,
            malformed = outcome.report.rows_malformed,
            missing_coordinates = outcome.report.rows_missing_coordinates,
            records = outcome.report.records,
            "Case data loaded"
        );

        Ok(outcome)
    }

    /// Clean CSV text that has already been fetched
    pub fn load_str(&self, csv_data: &str) -> PipelineResult<LoadOutcome> {
        self.validate()?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let headers = reader.headers()?.clone();
        let columns = self.mapping.resolve(&headers)?;

        let mut records = Vec::new();
        let mut report = LoadReport::default();

        for (line_num, result) in reader.records().take(self.max_rows).enumerate() {
            report.rows_read += 1;

            let row = match result {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(line = line_num + 2, error = %e, "Skipping malformed row");
                    report.rows_malformed += 1;
                    continue;
                }
            };

            // Short rows are kept with blank trailing cells; long rows are malformed
            if row.len() > headers.len() {
                tracing::debug!(
                    line = line_num + 2,
                    fields = row.len(),
                    expected = headers.len(),
                    "Skipping row with extra fields"
                );
                report.rows_malformed += 1;
                continue;
            }

            match parse_row(&row, &columns) {
                Some(record) => records.push(record),
                None => report.rows_missing_coordinates += 1,
            }
        }

        report.records = records.len();

        Ok(LoadOutcome { records, report })
    }

    fn validate(&self) -> PipelineResult<()> {
        if self.max_rows == 0 {
            return Err(DataSourceError::InvalidParameters(
                "max_rows must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build a record from a row, or `None` when a coordinate is missing
fn parse_row(row: &csv::StringRecord, columns: &ColumnIndex) -> Option<CaseRecord> {
    let cell = |idx: usize| row.get(idx).unwrap_or("");

    let latitude = parse_coordinate(cell(columns.latitude))?;
    let longitude = parse_coordinate(cell(columns.longitude))?;

    Some(CaseRecord::new(
        cell(columns.location),
        latitude,
        longitude,
        cell(columns.gender),
        cell(columns.nationality),
    ))
}

/// Empty, unparseable and non-finite cells all count as missing
fn parse_coordinate(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::source::InlineSource;
    use crate::pipeline::types::{Gender, NationalityGroup};

    const SAMPLE: &str = "Case,Gender,Nationality,Cluster_local,Latitude,Longitude
1,f,singapore,Mustafa Centre,1.3100,103.8560
2,m,india,S11 Dormitory,1.4070,103.8800
3,f,singapore,Mustafa Centre,1.3101,103.8561
4,x,china,Unlinked,,103.8000
5,m,singapore,Westlite Toh Guan,nan,103.7450";

    #[test]
    fn test_load_cleans_rows() {
        let outcome = CaseLoader::default().load_str(SAMPLE).unwrap();

        assert_eq!(outcome.report.rows_read, 5);
        assert_eq!(outcome.report.rows_missing_coordinates, 2);
        assert_eq!(outcome.report.records, 3);

        let first = &outcome.records[0];
        assert_eq!(first.location, "Mustafa Centre");
        assert_eq!(first.gender, Gender::Female);
        assert_eq!(first.nationality, "singapore");
        assert_eq!(outcome.records[1].gender, Gender::Male);
    }

    #[test]
    fn test_every_record_has_coordinates() {
        let outcome = CaseLoader::default().load_str(SAMPLE).unwrap();
        assert!(outcome
            .records
            .iter()
            .all(|r| r.latitude.is_finite() && r.longitude.is_finite()));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let csv_data = "cluster_local,latitude,longitude,gender,nationality
A,1.0,1.0,f,singapore
B,2.0,2.0,m,japan,extra,fields
C,3.0,3.0,m,japan";

        let outcome = CaseLoader::default().load_str(csv_data).unwrap();

        assert_eq!(outcome.report.rows_read, 3);
        assert_eq!(outcome.report.rows_malformed, 1);
        let locations: Vec<&str> = outcome.records.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["A", "C"]);
    }

    #[test]
    fn test_short_rows_are_kept() {
        let csv_data = "cluster_local,latitude,longitude,gender,nationality
A,1.0,1.0,f
B,2.0,2.0,m,japan
C,3.0";

        let outcome = CaseLoader::default().load_str(csv_data).unwrap();

        assert_eq!(outcome.report.rows_malformed, 0);
        assert_eq!(outcome.report.rows_missing_coordinates, 1);
        let locations: Vec<&str> = outcome.records.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["A", "B"]);

        let short = &outcome.records[0];
        assert_eq!(short.gender, Gender::Female);
        assert_eq!(short.nationality, "");
        assert!(NationalityGroup::Foreign.matches(&short.nationality));
    }

    #[test]
    fn test_max_rows_caps_reading() {
        let outcome = CaseLoader::new(2).load_str(SAMPLE).unwrap();
        assert_eq!(outcome.report.rows_read, 2);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn test_zero_max_rows_rejected() {
        let err = CaseLoader::new(0).load_str(SAMPLE).unwrap_err();
        assert!(matches!(err, DataSourceError::InvalidParameters(_)));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv_data = "cluster_local,latitude,gender,nationality\nA,1.0,f,singapore";
        let err = CaseLoader::default().load_str(csv_data).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(_)));
    }

    #[test]
    fn test_unknown_gender_passes_through() {
        let csv_data = "cluster_local,latitude,longitude,gender,nationality
A,1.0,1.0,F,singapore
A,1.0,1.0,unknown,singapore";

        let outcome = CaseLoader::default().load_str(csv_data).unwrap();
        assert_eq!(outcome.records[0].gender.as_str(), "F");
        assert_eq!(outcome.records[1].gender.as_str(), "unknown");
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let source = InlineSource::new(SAMPLE);
        let outcome = CaseLoader::default().load(&source).await.unwrap();
        assert_eq!(outcome.records.len(), 3);
    }
}
