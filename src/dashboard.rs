use serde::Serialize;

use crate::dataset::Dataset;
use crate::forecast::{self, DriverParams, FORECAST_YEARS};
use crate::history::{self, YearRange};
use crate::models::{ForecastPoint, Measurement};

pub const DEFAULT_LOCATIONS: [&str; 2] = ["Kuber Complex", "Railway Station"];
pub const DEFAULT_YEAR_RANGE: YearRange = YearRange {
    start: 2000,
    end: 2024,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    UrbanGrowth,
    TrafficDensity,
    IndustrialActivity,
    GreenSpaces,
    NoisePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    SelectLocation(String),
    DeselectLocation(String),
    SetYearRange(YearRange),
    SetDriver(Driver, i32),
}

/// The inputs a session can change. Everything shown is derived from these.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub locations: Vec<String>,
    pub years: YearRange,
    pub drivers: DriverParams,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            locations: DEFAULT_LOCATIONS.iter().map(|l| l.to_string()).collect(),
            years: DEFAULT_YEAR_RANGE,
            drivers: DriverParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub location: String,
    pub history: Vec<Measurement>,
    pub forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub years: YearRange,
    pub drivers: DriverParams,
    pub locations: Vec<LocationView>,
}

impl DashboardState {
    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::SelectLocation(name) => {
                if !self.locations.contains(&name) {
                    self.locations.push(name);
                }
            }
            DashboardEvent::DeselectLocation(name) => self.locations.retain(|l| *l != name),
            DashboardEvent::SetYearRange(range) => self.years = range,
            DashboardEvent::SetDriver(driver, value) => {
                let value = value.clamp(0, 100);
                let drivers = &mut self.drivers;
                match driver {
                    Driver::UrbanGrowth => drivers.urban_growth = value,
                    Driver::TrafficDensity => drivers.traffic_density = value,
                    Driver::IndustrialActivity => drivers.industrial_activity = value,
                    Driver::GreenSpaces => drivers.green_spaces = value,
                    Driver::NoisePolicy => drivers.noise_policy = value,
                }
            }
        }
    }

    /// Recomputes every series from the current inputs.
    pub fn view(&self, dataset: &Dataset) -> DashboardView {
        let measurements = dataset.measurements();
        let locations = self
            .locations
            .iter()
            .map(|location| {
                let series = history::get_location_data(measurements, location);
                LocationView {
                    location: location.clone(),
                    history: history::filter_years(&series, self.years),
                    forecast: forecast::forecast_series(
                        measurements,
                        location,
                        FORECAST_YEARS,
                        &self.drivers,
                    ),
                }
            })
            .collect();

        DashboardView {
            years: self.years,
            drivers: self.drivers,
            locations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_covers_both_locations() {
        let dataset = Dataset::bundled().unwrap();
        let view = DashboardState::default().view(&dataset);
        assert_eq!(view.locations.len(), 2);
        for location in &view.locations {
            assert_eq!(location.history.len(), 25);
            assert_eq!(location.forecast.len(), 21);
        }
    }

    #[test]
    fn events_change_the_next_view() {
        let dataset = Dataset::bundled().unwrap();
        let mut state = DashboardState::default();
        let before = state.view(&dataset);

        state.apply(DashboardEvent::SetDriver(Driver::TrafficDensity, 95));
        state.apply(DashboardEvent::SetYearRange(YearRange::new(2010, 2012)));
        state.apply(DashboardEvent::DeselectLocation("Railway Station".to_string()));
        state.apply(DashboardEvent::SelectLocation("Satpati Beach".to_string()));
        state.apply(DashboardEvent::SelectLocation("Satpati Beach".to_string()));

        let after = state.view(&dataset);
        let names: Vec<&str> = after.locations.iter().map(|l| l.location.as_str()).collect();
        assert_eq!(names, vec!["Kuber Complex", "Satpati Beach"]);
        assert_eq!(after.locations[0].history.len(), 3);
        assert!(
            after.locations[0].forecast[20].predicted_db
                > before.locations[0].forecast[20].predicted_db
        );
    }

    #[test]
    fn driver_events_are_clamped() {
        let mut state = DashboardState::default();
        state.apply(DashboardEvent::SetDriver(Driver::GreenSpaces, 140));
        state.apply(DashboardEvent::SetDriver(Driver::NoisePolicy, -3));
        assert_eq!(state.drivers.green_spaces, 100);
        assert_eq!(state.drivers.noise_policy, 0);
    }

    #[test]
    fn same_inputs_same_view() {
        let dataset = Dataset::bundled().unwrap();
        let state = DashboardState::default();
        assert_eq!(state.view(&dataset), state.view(&dataset));
    }
}
