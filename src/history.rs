use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{LocationLevel, Measurement, YearSnapshot};

/// Inclusive span of years used to narrow a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

/// Every measurement recorded for `location`, oldest first. Unknown names
/// produce an empty series.
pub fn get_location_data(measurements: &[Measurement], location: &str) -> Vec<Measurement> {
    let mut series: Vec<Measurement> = measurements
        .iter()
        .filter(|m| m.location == location)
        .cloned()
        .collect();
    series.sort_by_key(|m| m.year);
    series
}

pub fn filter_years(series: &[Measurement], range: YearRange) -> Vec<Measurement> {
    series
        .iter()
        .filter(|m| range.contains(m.year))
        .cloned()
        .collect()
}

pub fn get_historical_data(measurements: &[Measurement], year: i32) -> Option<YearSnapshot> {
    let locations: Vec<LocationLevel> = measurements
        .iter()
        .filter(|m| m.year == year)
        .map(|m| LocationLevel {
            name: m.location.clone(),
            average_noise: m.average_noise,
        })
        .collect();

    if locations.is_empty() {
        None
    } else {
        Some(YearSnapshot { year, locations })
    }
}

/// Unique location names in the order they first appear.
pub fn all_locations(measurements: &[Measurement]) -> Vec<String> {
    let mut seen: IndexMap<&str, ()> = IndexMap::new();
    for m in measurements {
        seen.entry(m.location.as_str()).or_insert(());
    }
    seen.into_keys().map(str::to_string).collect()
}

pub fn last_year(measurements: &[Measurement]) -> Option<i32> {
    measurements.iter().map(|m| m.year).max()
}

/// Most recent measurement for a location.
pub fn latest(measurements: &[Measurement], location: &str) -> Option<Measurement> {
    measurements
        .iter()
        .filter(|m| m.location == location)
        .max_by_key(|m| m.year)
        .cloned()
}

/// Mean level across a series; `None` when the series is empty.
pub fn mean_level(series: &[Measurement]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let total: f64 = series.iter().map(|m| m.average_noise).sum();
    Some(total / series.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn measurement(location: &str, year: i32, average_noise: f64) -> Measurement {
        Measurement {
            location: location.to_string(),
            year,
            average_noise,
        }
    }

    #[test]
    fn location_series_is_ordered_by_year() {
        let data = vec![
            measurement("Kuber Complex", 2002, 63.0),
            measurement("Railway Station", 2000, 70.0),
            measurement("Kuber Complex", 2000, 61.0),
            measurement("Kuber Complex", 2001, 62.0),
        ];
        let series = get_location_data(&data, "Kuber Complex");
        let years: Vec<i32> = series.iter().map(|m| m.year).collect();
        assert_eq!(years, vec![2000, 2001, 2002]);
        assert!(series.iter().all(|m| m.location == "Kuber Complex"));
    }

    #[test]
    fn unknown_location_is_empty() {
        let dataset = Dataset::bundled().unwrap();
        assert!(get_location_data(dataset.measurements(), "Nonexistent Place").is_empty());
        assert!(latest(dataset.measurements(), "Nonexistent Place").is_none());
    }

    #[test]
    fn single_year_filter_returns_that_year() {
        let dataset = Dataset::bundled().unwrap();
        for location in all_locations(dataset.measurements()) {
            let series = get_location_data(dataset.measurements(), &location);
            for m in &series {
                let hit = filter_years(&series, YearRange::new(m.year, m.year));
                assert_eq!(hit.len(), 1);
                assert_eq!(&hit[0], m);
            }
        }
    }

    #[test]
    fn range_filter_keeps_boundaries_and_order() {
        let dataset = Dataset::bundled().unwrap();
        let series = get_location_data(dataset.measurements(), "Kuber Complex");
        let window = filter_years(&series, YearRange::new(2005, 2010));
        let years: Vec<i32> = window.iter().map(|m| m.year).collect();
        assert_eq!(years, vec![2005, 2006, 2007, 2008, 2009, 2010]);
        assert!((window[5].average_noise - 64.8).abs() < 1e-9);
    }

    #[test]
    fn reversed_range_is_empty() {
        let dataset = Dataset::bundled().unwrap();
        let series = get_location_data(dataset.measurements(), "Kuber Complex");
        assert!(filter_years(&series, YearRange::new(2010, 2005)).is_empty());
    }

    #[test]
    fn snapshot_holds_every_location() {
        let dataset = Dataset::bundled().unwrap();
        let snapshot = get_historical_data(dataset.measurements(), 2000).unwrap();
        assert_eq!(snapshot.locations.len(), 8);
        assert_eq!(snapshot.locations[0].name, "Kuber Complex");
        assert!(get_historical_data(dataset.measurements(), 1990).is_none());
    }

    #[test]
    fn locations_keep_first_seen_order() {
        let dataset = Dataset::bundled().unwrap();
        let locations = all_locations(dataset.measurements());
        assert_eq!(locations.len(), 8);
        assert_eq!(locations[0], "Kuber Complex");
        assert_eq!(locations[1], "Railway Station");
        assert_eq!(last_year(dataset.measurements()), Some(2024));
    }

    #[test]
    fn mean_of_empty_series_is_none() {
        assert!(mean_level(&[]).is_none());
        let series = vec![measurement("A", 2000, 60.0), measurement("A", 2001, 64.0)];
        assert_eq!(mean_level(&series), Some(62.0));
    }
}
