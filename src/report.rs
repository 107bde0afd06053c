use std::fmt::Write;

use chrono::NaiveDate;

use crate::analysis;
use crate::dashboard::DashboardState;
use crate::dataset::Dataset;
use crate::history;
use crate::measures;

const FORECAST_MILESTONES: [i32; 3] = [2025, 2035, 2045];

pub fn build_report(
    dataset: &Dataset,
    state: &DashboardState,
    threshold: f64,
    generated_on: NaiveDate,
) -> String {
    let view = state.view(dataset);
    let mut output = String::new();

    let _ = writeln!(output, "# Palghar Noise Outlook");
    let _ = writeln!(
        output,
        "Generated {} for {}-{} with drivers urban {} / traffic {} / industry {} / green {} / policy {}",
        generated_on,
        view.years.start,
        view.years.end,
        view.drivers.urban_growth,
        view.drivers.traffic_density,
        view.drivers.industrial_activity,
        view.drivers.green_spaces,
        view.drivers.noise_policy
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Historical Trend");

    if view.locations.is_empty() {
        let _ = writeln!(output, "No locations selected.");
    }
    for location in view.locations.iter() {
        match (location.history.first(), location.history.last()) {
            (Some(first), Some(last)) => {
                let mean = history::mean_level(&location.history).unwrap_or(last.average_noise);
                let _ = writeln!(
                    output,
                    "- {}: {:.1} dB ({}) to {:.1} dB ({}), change {:+.1} dB, mean {:.1} dB",
                    location.location,
                    first.average_noise,
                    first.year,
                    last.average_noise,
                    last.year,
                    last.average_noise - first.average_noise,
                    mean
                );
            }
            _ => {
                let _ = writeln!(output, "- {}: no data in this range", location.location);
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Forecast");
    for location in view.locations.iter() {
        let milestones: Vec<String> = location
            .forecast
            .iter()
            .filter(|p| FORECAST_MILESTONES.contains(&p.year))
            .map(|p| format!("{} {:.1} dB", p.year, p.predicted_db))
            .collect();
        let _ = writeln!(output, "- {}: {}", location.location, milestones.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monitoring Readings (threshold {threshold:.0} dB)");
    let mut any_readings = false;
    for location in view.locations.iter() {
        let readings: Vec<_> = dataset
            .readings()
            .iter()
            .filter(|r| r.name == location.location)
            .cloned()
            .collect();
        if let Some(summary) = analysis::summarize(&readings, threshold) {
            any_readings = true;
            let _ = writeln!(
                output,
                "- {}: avg {:.1} dB, peak {:.1} dB, {} of {} readings above threshold ({:.0}%)",
                location.location,
                summary.avg_noise,
                summary.max_noise,
                summary.exceedance_count,
                summary.reading_count,
                summary.exceedance_percentage
            );
        }
    }
    if !any_readings {
        let _ = writeln!(output, "No readings recorded for the selected locations.");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Remedial Measures");
    output.push_str(&measures::render_markdown("###"));

    output
}
