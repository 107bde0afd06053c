use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One location's average level for one year of the bundled history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub location: String,
    pub year: i32,
    pub average_noise: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationLevel {
    pub name: String,
    pub average_noise: f64,
}

/// Every location's average for a single year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSnapshot {
    pub year: i32,
    pub locations: Vec<LocationLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub location: String,
    pub year: i32,
    pub predicted_db: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Zone {
    Residential,
    Commercial,
    Industrial,
    Silence,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Residential => "Residential",
            Zone::Commercial => "Commercial",
            Zone::Industrial => "Industrial",
            Zone::Silence => "Silence",
        }
    }
}

/// A dated morning/afternoon/evening reading at a mapped site.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NoiseReading {
    pub id: String,
    pub name: String,
    pub zone: Zone,
    pub lat: f64,
    pub lng: f64,
    pub date: NaiveDate,
    pub morning: f64,
    pub afternoon: f64,
    pub evening: f64,
}

impl NoiseReading {
    pub fn average(&self) -> f64 {
        (self.morning + self.afternoon + self.evening) / 3.0
    }

    /// Strictly above the threshold counts as an exceedance.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.average() > threshold
    }

    pub fn peak(&self) -> f64 {
        self.morning.max(self.afternoon).max(self.evening)
    }

    pub fn trough(&self) -> f64 {
        self.morning.min(self.afternoon).min(self.evening)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAverages {
    pub morning: f64,
    pub afternoon: f64,
    pub evening: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingSummary {
    pub reading_count: usize,
    pub avg_noise: f64,
    pub max_noise: f64,
    pub min_noise: f64,
    pub exceedance_count: usize,
    pub exceedance_percentage: f64,
    pub time_of_day: PeriodAverages,
}

/// Monthly day/night levels for a monitoring station.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationMonth {
    #[serde(rename = "Station")]
    pub station: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day", default, deserialize_with = "csv::invalid_option")]
    pub day: Option<f64>,
    #[serde(rename = "Night", default, deserialize_with = "csv::invalid_option")]
    pub night: Option<f64>,
    #[serde(rename = "DayLimit", default, deserialize_with = "csv::invalid_option")]
    pub day_limit: Option<f64>,
    #[serde(rename = "NightLimit", default, deserialize_with = "csv::invalid_option")]
    pub night_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationInfo {
    #[serde(rename = "Station")]
    pub station: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Type")]
    pub station_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAverage {
    pub city: String,
    pub avg_day: Option<f64>,
    pub avg_night: Option<f64>,
    pub day_limit: Option<f64>,
    pub night_limit: Option<f64>,
}
