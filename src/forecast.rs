use std::ops::RangeInclusive;

use anyhow::bail;
use serde::Serialize;

use crate::history;
use crate::models::{ForecastPoint, Measurement};

/// Baseline used when a location has no recorded history.
pub const DEFAULT_BASELINE_DB: f64 = 65.0;
/// Year the default baseline is anchored to when the dataset is empty.
pub const DEFAULT_BASELINE_YEAR: i32 = 2024;
pub const MIN_PREDICTED_DB: f64 = 30.0;
pub const MAX_PREDICTED_DB: f64 = 120.0;
/// Upward drift per year with every driver at its neutral midpoint.
pub const BASE_ANNUAL_DRIFT_DB: f64 = 0.10;
pub const NEUTRAL_DRIVER: i32 = 50;
pub const FORECAST_YEARS: RangeInclusive<i32> = 2025..=2045;
/// Widest span of years a single forecast request may cover.
pub const MAX_FORECAST_SPAN: i64 = 200;

const URBAN_GROWTH_WEIGHT: f64 = 0.15;
const TRAFFIC_DENSITY_WEIGHT: f64 = 0.12;
const INDUSTRIAL_ACTIVITY_WEIGHT: f64 = 0.10;
const GREEN_SPACES_WEIGHT: f64 = 0.08;
const NOISE_POLICY_WEIGHT: f64 = 0.10;

/// Scenario assumptions, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriverParams {
    pub urban_growth: i32,
    pub traffic_density: i32,
    pub industrial_activity: i32,
    pub green_spaces: i32,
    pub noise_policy: i32,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self::new(
            NEUTRAL_DRIVER,
            NEUTRAL_DRIVER,
            NEUTRAL_DRIVER,
            NEUTRAL_DRIVER,
            NEUTRAL_DRIVER,
        )
    }
}

impl DriverParams {
    pub fn new(
        urban_growth: i32,
        traffic_density: i32,
        industrial_activity: i32,
        green_spaces: i32,
        noise_policy: i32,
    ) -> Self {
        Self {
            urban_growth,
            traffic_density,
            industrial_activity,
            green_spaces,
            noise_policy,
        }
    }

    pub fn clamped(&self) -> Self {
        Self::new(
            self.urban_growth.clamp(0, 100),
            self.traffic_density.clamp(0, 100),
            self.industrial_activity.clamp(0, 100),
            self.green_spaces.clamp(0, 100),
            self.noise_policy.clamp(0, 100),
        )
    }

    /// dB added per elapsed year under these assumptions.
    pub fn annual_change(&self) -> f64 {
        let p = self.clamped();
        BASE_ANNUAL_DRIFT_DB
            + URBAN_GROWTH_WEIGHT * deviation(p.urban_growth)
            + TRAFFIC_DENSITY_WEIGHT * deviation(p.traffic_density)
            + INDUSTRIAL_ACTIVITY_WEIGHT * deviation(p.industrial_activity)
            - GREEN_SPACES_WEIGHT * deviation(p.green_spaces)
            - NOISE_POLICY_WEIGHT * deviation(p.noise_policy)
    }
}

fn deviation(value: i32) -> f64 {
    f64::from(value - NEUTRAL_DRIVER) / f64::from(NEUTRAL_DRIVER)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub year: i32,
    pub level: f64,
    pub from_history: bool,
}

/// The latest recorded average for the location, or the default baseline
/// anchored at the dataset's final year. A default baseline never drifts.
pub fn baseline_for(measurements: &[Measurement], location: &str) -> Baseline {
    match history::latest(measurements, location) {
        Some(m) if m.average_noise.is_finite() => Baseline {
            year: m.year,
            level: m.average_noise,
            from_history: true,
        },
        _ => Baseline {
            year: history::last_year(measurements).unwrap_or(DEFAULT_BASELINE_YEAR),
            level: DEFAULT_BASELINE_DB,
            from_history: false,
        },
    }
}

/// Heuristic projection of a location's average level in `target_year`.
///
/// Years at or before the baseline year return the baseline itself; later
/// years add `annual_change` once per elapsed year. The result is clamped
/// to [`MIN_PREDICTED_DB`, `MAX_PREDICTED_DB`]. Locations without history
/// get [`DEFAULT_BASELINE_DB`] for every year and driver set.
pub fn predict_future_noise(
    measurements: &[Measurement],
    location: &str,
    target_year: i32,
    drivers: &DriverParams,
) -> f64 {
    let baseline = baseline_for(measurements, location);
    project(&baseline, target_year, drivers)
}

fn project(baseline: &Baseline, target_year: i32, drivers: &DriverParams) -> f64 {
    if !baseline.from_history {
        return DEFAULT_BASELINE_DB;
    }
    let elapsed = (i64::from(target_year) - i64::from(baseline.year)).max(0) as f64;
    let predicted = baseline.level + elapsed * drivers.annual_change();
    predicted.clamp(MIN_PREDICTED_DB, MAX_PREDICTED_DB)
}

pub fn forecast_window(from: i32, to: i32) -> anyhow::Result<RangeInclusive<i32>> {
    let span = i64::from(to) - i64::from(from);
    if span < 0 {
        bail!("forecast window {from}..={to} ends before it starts");
    }
    if span > MAX_FORECAST_SPAN {
        bail!("forecast window {from}..={to} spans {span} years, limit is {MAX_FORECAST_SPAN}");
    }
    Ok(from..=to)
}

pub fn forecast_series(
    measurements: &[Measurement],
    location: &str,
    years: RangeInclusive<i32>,
    drivers: &DriverParams,
) -> Vec<ForecastPoint> {
    let baseline = baseline_for(measurements, location);
    if !baseline.from_history {
        tracing::debug!(location, "no history, forecast held at default baseline");
    }

    years
        .map(|year| ForecastPoint {
            location: location.to_string(),
            year,
            predicted_db: project(&baseline, year, drivers),
        })
        .collect()
}
