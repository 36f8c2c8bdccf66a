//! Aggregations over cleaned case records
//!
//! All functions are pure: they borrow their inputs and build new tables.
//! Frequency tables are sorted by count, highest first, with ties left in
//! the order the location was first encountered.

use std::collections::{HashMap, HashSet};

use super::types::{
    CaseRecord, Centroid, CountRange, DensityPoint, GenderCount, LocationAnchor, LocationCount,
    LocationView, LocationViewRow, NationalityGroup,
};

/// Default length of the nationality top-N table
pub const DEFAULT_TOP_N: usize = 5;

/// One anchor per distinct location, keeping the first coordinates seen
pub fn build_location_anchors(records: &[CaseRecord]) -> Vec<LocationAnchor> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut anchors = Vec::new();

    for record in records {
        if seen.insert(record.location.as_str()) {
            anchors.push(LocationAnchor {
                location: record.location.clone(),
                latitude: record.latitude,
                longitude: record.longitude,
            });
        }
    }

    anchors
}

/// Number of records per location, highest count first
///
/// A blank location is a missing value and is not counted.
pub fn location_frequencies<'a, I>(records: I) -> Vec<LocationCount>
where
    I: IntoIterator<Item = &'a CaseRecord>,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<LocationCount> = Vec::new();

    for record in records {
        if record.location.is_empty() {
            continue;
        }

        match positions.get(record.location.as_str()) {
            Some(&idx) => counts[idx].numbers += 1,
            None => {
                positions.insert(record.location.as_str(), counts.len());
                counts.push(LocationCount {
                    location: record.location.clone(),
                    numbers: 1,
                });
            }
        }
    }

    // sort_by is stable, so equal counts stay in encounter order
    counts.sort_by(|a, b| b.numbers.cmp(&a.numbers));
    counts
}

/// Join per-location counts with anchors into `[location, latitude, longitude, numbers]`
///
/// Inner join: a count whose location has no anchor is dropped.
pub fn build_location_view(records: &[CaseRecord], anchors: &[LocationAnchor]) -> LocationView {
    let by_location: HashMap<&str, &LocationAnchor> = anchors
        .iter()
        .map(|a| (a.location.as_str(), a))
        .collect();

    location_frequencies(records)
        .into_iter()
        .filter_map(|count| {
            let anchor = by_location.get(count.location.as_str())?;
            Some(LocationViewRow {
                latitude: anchor.latitude,
                longitude: anchor.longitude,
                location: count.location,
                numbers: count.numbers,
            })
        })
        .collect()
}

/// Rows whose count falls inside the inclusive range. May be empty.
pub fn filter_by_count_range(view: &[LocationViewRow], range: CountRange) -> LocationView {
    view.iter()
        .filter(|row| range.contains(row.numbers))
        .cloned()
        .collect()
}

/// Records whose location is one of `locations`
pub fn filter_records_by_locations<'a, I, S>(
    records: &'a [CaseRecord],
    locations: I,
) -> Vec<&'a CaseRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let wanted: HashSet<String> = locations
        .into_iter()
        .map(|l| l.as_ref().to_string())
        .collect();

    records
        .iter()
        .filter(|r| wanted.contains(&r.location))
        .collect()
}

/// Most frequent locations within one nationality partition
pub fn top_locations_by_nationality(
    records: &[CaseRecord],
    group: NationalityGroup,
    top_n: usize,
) -> Vec<LocationCount> {
    let mut counts =
        location_frequencies(records.iter().filter(|r| group.matches(&r.nationality)));
    counts.truncate(top_n);
    counts
}

/// Count per gender value, in first-encounter order
pub fn gender_breakdown<'a, I>(records: I) -> Vec<GenderCount>
where
    I: IntoIterator<Item = &'a CaseRecord>,
{
    let mut breakdown: Vec<GenderCount> = Vec::new();

    for record in records {
        match breakdown.iter_mut().find(|g| g.gender == record.gender) {
            Some(bucket) => bucket.count += 1,
            None => breakdown.push(GenderCount {
                gender: record.gender.clone(),
                count: 1,
            }),
        }
    }

    breakdown
}

/// Arithmetic mean of anchor coordinates
pub fn centroid(anchors: &[LocationAnchor]) -> Option<Centroid> {
    if anchors.is_empty() {
        return None;
    }

    let n = anchors.len() as f64;
    let latitude = anchors.iter().map(|a| a.latitude).sum::<f64>() / n;
    let longitude = anchors.iter().map(|a| a.longitude).sum::<f64>() / n;

    Some(Centroid {
        latitude,
        longitude,
    })
}

/// One point per record for the density layer
pub fn density_points(records: &[CaseRecord]) -> Vec<DensityPoint> {
    records.iter().map(DensityPoint::from).collect()
}
