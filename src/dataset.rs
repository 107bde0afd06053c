use anyhow::Context;
use serde::Deserialize;

use crate::models::{Measurement, NoiseReading};

const HISTORICAL_CSV: &str = include_str!("../data/historical_noise.csv");
const READINGS_CSV: &str = include_str!("../data/noise_readings.csv");

/// Read-only reference data bundled with the binary.
#[derive(Debug, Clone)]
pub struct Dataset {
    measurements: Vec<Measurement>,
    readings: Vec<NoiseReading>,
}

impl Dataset {
    pub fn bundled() -> anyhow::Result<Self> {
        let measurements =
            parse_measurements(HISTORICAL_CSV).context("failed to parse bundled history")?;
        let readings =
            parse_readings(READINGS_CSV).context("failed to parse bundled noise readings")?;

        tracing::debug!(
            measurements = measurements.len(),
            readings = readings.len(),
            "loaded bundled dataset"
        );

        Ok(Self::new(measurements, readings))
    }

    pub fn new(mut measurements: Vec<Measurement>, readings: Vec<NoiseReading>) -> Self {
        // Stable sort keeps the file's location order within each year.
        measurements.sort_by_key(|m| m.year);
        Self {
            measurements,
            readings,
        }
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn readings(&self) -> &[NoiseReading] {
        &self.readings
    }
}

pub fn parse_measurements(text: &str) -> anyhow::Result<Vec<Measurement>> {
    #[derive(Deserialize)]
    struct CsvRow {
        year: i32,
        location: String,
        average_noise: f64,
    }

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut measurements = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid history row {}", index + 1))?;
        measurements.push(Measurement {
            location: row.location,
            year: row.year,
            average_noise: row.average_noise,
        });
    }

    Ok(measurements)
}

pub fn parse_readings(text: &str) -> anyhow::Result<Vec<NoiseReading>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut readings = Vec::new();

    for (index, result) in reader.deserialize::<NoiseReading>().enumerate() {
        let row = result.with_context(|| format!("invalid reading row {}", index + 1))?;
        readings.push(row);
    }

    Ok(readings)
}
