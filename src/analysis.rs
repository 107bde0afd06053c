use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{NoiseReading, PeriodAverages, ReadingSummary};

pub const DEFAULT_THRESHOLD_DB: f64 = 70.0;

/// Readings for one site between two dates, both ends included.
pub fn filter_readings(
    readings: &[NoiseReading],
    location: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NoiseReading> {
    readings
        .iter()
        .filter(|r| r.name == location && r.date >= start && r.date <= end)
        .cloned()
        .collect()
}

/// Aggregate statistics; `None` when there is nothing to average.
pub fn summarize(readings: &[NoiseReading], threshold: f64) -> Option<ReadingSummary> {
    if readings.is_empty() {
        return None;
    }

    let count = readings.len() as f64;
    let mut total = 0.0;
    let mut max_noise = f64::MIN;
    let mut min_noise = f64::MAX;
    let mut exceedance_count = 0usize;
    let mut periods = (0.0, 0.0, 0.0);

    for reading in readings {
        total += reading.average();
        max_noise = max_noise.max(reading.peak());
        min_noise = min_noise.min(reading.trough());
        if reading.exceeds(threshold) {
            exceedance_count += 1;
        }
        periods.0 += reading.morning;
        periods.1 += reading.afternoon;
        periods.2 += reading.evening;
    }

    Some(ReadingSummary {
        reading_count: readings.len(),
        avg_noise: total / count,
        max_noise,
        min_noise,
        exceedance_count,
        exceedance_percentage: exceedance_count as f64 / count * 100.0,
        time_of_day: PeriodAverages {
            morning: periods.0 / count,
            afternoon: periods.1 / count,
            evening: periods.2 / count,
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerStatus {
    Selected,
    Exceeds,
    WithinLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub average: f64,
    pub status: MarkerStatus,
}

/// Map markers for every reading taken on `date`. Readings without usable
/// coordinates are left off the map.
pub fn map_markers(
    readings: &[NoiseReading],
    date: NaiveDate,
    threshold: f64,
    selected: Option<&str>,
) -> Vec<MapMarker> {
    readings
        .iter()
        .filter(|r| r.date == date)
        .filter_map(|r| {
            if !(r.lat.is_finite() && r.lng.is_finite()) {
                tracing::warn!(name = %r.name, lat = r.lat, lng = r.lng, "invalid coordinates");
                return None;
            }
            let average = r.average();
            let status = if selected == Some(r.name.as_str()) {
                MarkerStatus::Selected
            } else if average > threshold {
                MarkerStatus::Exceeds
            } else {
                MarkerStatus::WithinLimit
            };
            Some(MapMarker {
                id: r.id.clone(),
                name: r.name.clone(),
                lat: r.lat,
                lng: r.lng,
                average,
                status,
            })
        })
        .collect()
}

pub fn unique_dates(readings: &[NoiseReading]) -> Vec<NaiveDate> {
    readings
        .iter()
        .map(|r| r.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn export_csv(readings: &[NoiseReading]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Location",
        "Type",
        "Date",
        "Morning",
        "Afternoon",
        "Evening",
        "Average",
    ])?;

    for r in readings {
        writer.write_record([
            r.name.clone(),
            r.zone.as_str().to_string(),
            r.date.to_string(),
            r.morning.to_string(),
            r.afternoon.to_string(),
            r.evening.to_string(),
            format!("{:.1}", r.average()),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv export: {}", err.error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn export_file_name(location: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!("noise-analysis-{location}-{start}-{end}.csv")
}
