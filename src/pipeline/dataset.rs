//! Case Dataset
//!
//! The immutable product of one load cycle. Anchors and the location view
//! are derived once when the dataset is built; every dashboard interaction
//! then filters these tables without touching the source again.

use chrono::{DateTime, Utc};

use super::aggregate;
use super::loader::{LoadOutcome, LoadReport};
use super::types::{
    CaseRecord, Centroid, CountRange, DensityPoint, GenderCount, LocationAnchor, LocationCount,
    LocationView, LocationViewRow, NationalityGroup,
};

/// Records and derived tables from a single load
#[derive(Debug, Clone)]
pub struct CaseDataset {
    records: Vec<CaseRecord>,
    anchors: Vec<LocationAnchor>,
    view: LocationView,
    report: LoadReport,
    loaded_at: DateTime<Utc>,
}

impl CaseDataset {
    /// Derive anchors and the location view from cleaned records
    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        let report = LoadReport {
            rows_read: records.len(),
            records: records.len(),
            ..Default::default()
        };
        Self::build(records, report)
    }

    pub fn from_outcome(outcome: LoadOutcome) -> Self {
        Self::build(outcome.records, outcome.report)
    }

    fn build(records: Vec<CaseRecord>, report: LoadReport) -> Self {
        let anchors = aggregate::build_location_anchors(&records);
        let view = aggregate::build_location_view(&records, &anchors);

        tracing::debug!(
            records = records.len(),
            locations = anchors.len(),
            "Derived location view"
        );

        Self {
            records,
            anchors,
            view,
            report,
            loaded_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn anchors(&self) -> &[LocationAnchor] {
        &self.anchors
    }

    pub fn view(&self) -> &[LocationViewRow] {
        &self.view
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Locations whose case count is inside `range`
    pub fn locations_in_range(&self, range: CountRange) -> LocationView {
        aggregate::filter_by_count_range(&self.view, range)
    }

    /// Records belonging to the locations inside `range`
    pub fn records_in_range(&self, range: CountRange) -> Vec<&CaseRecord> {
        let selected = self.locations_in_range(range);
        aggregate::filter_records_by_locations(&self.records, selected.iter().map(|r| &r.location))
    }

    /// Gender histogram for the locations inside `range`
    pub fn gender_breakdown(&self, range: CountRange) -> Vec<GenderCount> {
        aggregate::gender_breakdown(self.records_in_range(range))
    }

    /// Most frequent locations for one nationality group
    pub fn top_locations(&self, group: NationalityGroup, top_n: usize) -> Vec<LocationCount> {
        aggregate::top_locations_by_nationality(&self.records, group, top_n)
    }

    /// Mean anchor position, `None` for an empty dataset
    pub fn centroid(&self) -> Option<Centroid> {
        aggregate::centroid(&self.anchors)
    }

    pub fn density_points(&self) -> Vec<DensityPoint> {
        aggregate::density_points(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Gender;

    fn dataset() -> CaseDataset {
        CaseDataset::from_records(vec![
            CaseRecord::new("A", 1.0, 1.0, "f", "singapore"),
            CaseRecord::new("A", 1.0, 1.0, "m", "japan"),
            CaseRecord::new("B", 2.0, 2.0, "f", "singapore"),
        ])
    }

    #[test]
    fn test_derived_tables() {
        let ds = dataset();
        assert_eq!(ds.records().len(), 3);
        assert_eq!(ds.anchors().len(), 2);
        assert_eq!(ds.view().len(), 2);
        assert_eq!(ds.report().records, 3);
    }

    #[test]
    fn test_records_in_range() {
        let ds = dataset();
        let range = CountRange::new(2, 2).unwrap();

        let rows = ds.records_in_range(range);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.location == "A"));

        let genders = ds.gender_breakdown(range);
        assert_eq!(genders.len(), 2);
        assert_eq!(genders[0].gender, Gender::Female);
        assert_eq!(genders[1].gender, Gender::Male);
    }

    #[test]
    fn test_empty_range_yields_empty_tables() {
        let ds = dataset();
        let range = CountRange::new(100, 200).unwrap();
        assert!(ds.locations_in_range(range).is_empty());
        assert!(ds.gender_breakdown(range).is_empty());
    }

    #[test]
    fn test_top_locations_and_centroid() {
        let ds = dataset();
        let foreign = ds.top_locations(NationalityGroup::Foreign, 5);
        assert_eq!(foreign.len(), 1);
        assert_eq!(foreign[0].location, "A");

        let c = ds.centroid().unwrap();
        assert_eq!((c.latitude, c.longitude), (1.5, 1.5));
        assert_eq!(ds.density_points().len(), 3);
    }

    #[test]
    fn test_blank_location_hidden_from_views() {
        let ds = CaseDataset::from_records(vec![
            CaseRecord::new("", 1.0, 1.0, "m", "india"),
            CaseRecord::new("", 1.0, 1.0, "m", "india"),
            CaseRecord::new("A", 2.0, 2.0, "f", "india"),
        ]);

        assert_eq!(ds.view().len(), 1);
        assert_eq!(ds.view()[0].location, "A");

        let foreign = ds.top_locations(NationalityGroup::Foreign, 5);
        assert_eq!(foreign.len(), 1);
        assert_eq!(foreign[0].location, "A");

        // still part of the density layer and the map midpoint
        assert_eq!(ds.density_points().len(), 3);
        let c = ds.centroid().unwrap();
        assert_eq!((c.latitude, c.longitude), (1.5, 1.5));
    }

    #[test]
    fn test_empty_dataset() {
        let ds = CaseDataset::from_records(Vec::new());
        assert!(ds.view().is_empty());
        assert!(ds.centroid().is_none());
    }
}
