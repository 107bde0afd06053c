use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

mod analysis;
mod config;
mod dashboard;
mod dataset;
mod feedback;
mod forecast;
mod history;
mod logging;
mod measures;
mod models;
mod report;
mod stations;

use config::Config;
use dashboard::{DashboardEvent, DashboardState, Driver};
use dataset::Dataset;
use forecast::DriverParams;
use history::YearRange;

#[derive(Parser)]
#[command(name = "noise-insights")]
#[command(about = "Noise pollution history, forecasts and comparisons for Palghar", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct DriverArgs {
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    urban_growth: i32,
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    traffic_density: i32,
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    industrial_activity: i32,
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    green_spaces: i32,
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    noise_policy: i32,
}

impl From<DriverArgs> for DriverParams {
    fn from(args: DriverArgs) -> Self {
        DriverParams::new(
            args.urban_growth,
            args.traffic_density,
            args.industrial_activity,
            args.green_spaces,
            args.noise_policy,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List monitored locations
    Locations,
    /// Show yearly averages for one or more locations
    History {
        #[arg(long = "location", required = true)]
        locations: Vec<String>,
        #[arg(long, default_value_t = 2000)]
        from: i32,
        #[arg(long, default_value_t = 2024)]
        to: i32,
        #[arg(long)]
        json: bool,
    },
    /// Show every location's average for a single year
    Snapshot {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        json: bool,
    },
    /// Project future levels under scenario drivers
    Forecast {
        #[arg(long = "location", required = true)]
        locations: Vec<String>,
        #[command(flatten)]
        drivers: DriverArgs,
        #[arg(long, default_value_t = *forecast::FORECAST_YEARS.start())]
        from: i32,
        #[arg(long, default_value_t = *forecast::FORECAST_YEARS.end())]
        to: i32,
        #[arg(long)]
        json: bool,
    },
    /// Summarise readings for a location and date range
    Analyze {
        #[arg(long)]
        location: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = analysis::DEFAULT_THRESHOLD_DB)]
        threshold: f64,
        /// Write the filtered readings as CSV into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Classify map markers for one reading date
    Markers {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = analysis::DEFAULT_THRESHOLD_DB)]
        threshold: f64,
        #[arg(long)]
        selected: Option<String>,
    },
    /// Compare day and night levels across cities from the station feeds
    CompareCities {
        #[arg(long, default_value_t = 2018)]
        year: i32,
        #[arg(long = "city")]
        cities: Vec<String>,
    },
    /// Print suggested remedial measures
    Measures,
    /// Submit feedback about noise in Palghar
    Feedback {
        #[arg(long)]
        message: String,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown outlook report
    Report {
        #[arg(long = "location")]
        locations: Vec<String>,
        #[command(flatten)]
        drivers: DriverArgs,
        #[arg(long, default_value_t = dashboard::DEFAULT_YEAR_RANGE.start)]
        from: i32,
        #[arg(long, default_value_t = dashboard::DEFAULT_YEAR_RANGE.end)]
        to: i32,
        #[arg(long, default_value_t = analysis::DEFAULT_THRESHOLD_DB)]
        threshold: f64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fmt_db(value: Option<f64>) -> String {
    value.map_or_else(|| "no data".to_string(), |v| format!("{v:.1} dB"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::from_env();
    let dataset = Dataset::bundled()?;
    let measurements = dataset.measurements();

    match cli.command {
        Commands::Locations => {
            for location in history::all_locations(measurements) {
                println!("{location}");
            }
        }
        Commands::History {
            locations,
            from,
            to,
            json,
        } => {
            let range = YearRange::new(from, to);
            let series: Vec<_> = locations
                .iter()
                .map(|l| history::filter_years(&history::get_location_data(measurements, l), range))
                .collect();

            if json {
                return print_json(&series);
            }
            for (location, points) in locations.iter().zip(series.iter()) {
                println!("{location}:");
                if points.is_empty() {
                    println!("  no measurements between {from} and {to}");
                }
                for m in points {
                    println!("  {} {:.1} dB", m.year, m.average_noise);
                }
            }
        }
        Commands::Snapshot { year, json } => {
            let Some(snapshot) = history::get_historical_data(measurements, year) else {
                println!("No measurements recorded for {year}.");
                return Ok(());
            };
            if json {
                return print_json(&snapshot);
            }
            println!("Average levels in {year}:");
            for level in &snapshot.locations {
                println!("- {} {:.1} dB", level.name, level.average_noise);
            }
        }
        Commands::Forecast {
            locations,
            drivers,
            from,
            to,
            json,
        } => {
            let drivers = DriverParams::from(drivers);
            let years = forecast::forecast_window(from, to)?;
            let series: Vec<_> = locations
                .iter()
                .map(|l| forecast::forecast_series(measurements, l, years.clone(), &drivers))
                .collect();

            if json {
                return print_json(&series);
            }
            for (location, points) in locations.iter().zip(series.iter()) {
                let baseline = forecast::baseline_for(measurements, location);
                println!(
                    "{location} (baseline {:.1} dB in {}{}):",
                    baseline.level,
                    baseline.year,
                    if baseline.from_history { "" } else { ", default" }
                );
                for p in points {
                    println!("  {} {:.1} dB", p.year, p.predicted_db);
                }
            }
        }
        Commands::Analyze {
            location,
            start,
            end,
            threshold,
            export,
        } => {
            let dates = analysis::unique_dates(dataset.readings());
            let (Some(first), Some(last)) = (dates.first().copied(), dates.last().copied()) else {
                println!("No readings available.");
                return Ok(());
            };
            let start = start.unwrap_or(first);
            let end = end.unwrap_or(last);
            let readings = analysis::filter_readings(dataset.readings(), &location, start, end);

            match analysis::summarize(&readings, threshold) {
                None => println!("No data available for the selected criteria."),
                Some(summary) => {
                    println!("{location} from {start} to {end}:");
                    println!("- average {:.1} dB", summary.avg_noise);
                    println!("- max {:.1} dB, min {:.1} dB", summary.max_noise, summary.min_noise);
                    println!(
                        "- {} of {} readings above {threshold:.0} dB ({:.1}%)",
                        summary.exceedance_count, summary.reading_count, summary.exceedance_percentage
                    );
                    println!(
                        "- morning {:.1} dB, afternoon {:.1} dB, evening {:.1} dB",
                        summary.time_of_day.morning,
                        summary.time_of_day.afternoon,
                        summary.time_of_day.evening
                    );
                }
            }

            if let Some(dir) = export {
                let path = dir.join(analysis::export_file_name(&location, start, end));
                let csv = analysis::export_csv(&readings)?;
                std::fs::write(&path, csv)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Exported {} readings to {}.", readings.len(), path.display());
            }
        }
        Commands::Markers {
            date,
            threshold,
            selected,
        } => {
            let date = match date.or_else(|| analysis::unique_dates(dataset.readings()).first().copied()) {
                Some(date) => date,
                None => {
                    println!("No readings available.");
                    return Ok(());
                }
            };
            let markers =
                analysis::map_markers(dataset.readings(), date, threshold, selected.as_deref());
            tracing::debug!(
                center = ?config.map.center,
                zoom = config.map.zoom,
                markers = markers.len(),
                "computed map markers"
            );
            print_json(&markers)?;
        }
        Commands::CompareCities { year, cities } => {
            let client = reqwest::Client::new();
            let data = stations::load_comparison(&client, &config.feeds).await;
            if data.is_empty() {
                println!("No station data available.");
                return Ok(());
            }

            if cities.is_empty() {
                let years: Vec<String> = stations::available_years(&data)
                    .iter()
                    .map(i32::to_string)
                    .collect();
                println!("Years: {}", years.join(", "));
                println!("Cities: {}", stations::available_cities(&data).join(", "));
                return Ok(());
            }

            let averages = stations::compare_cities(&data, year, &cities);
            if averages.is_empty() {
                println!("No station readings for the selected cities in {year}.");
            }
            for city in averages {
                println!(
                    "- {}: day {} (limit {}), night {} (limit {})",
                    city.city,
                    fmt_db(city.avg_day),
                    fmt_db(city.day_limit),
                    fmt_db(city.avg_night),
                    fmt_db(city.night_limit)
                );
            }
        }
        Commands::Measures => {
            print!("{}", measures::render_markdown("##"));
        }
        Commands::Feedback { message, json } => {
            let receipt = feedback::submit(&message)?;
            if json {
                return print_json(&receipt);
            }
            println!(
                "{} (reference {}, received {})",
                receipt.message,
                receipt.id,
                receipt.received_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        Commands::Report {
            locations,
            drivers,
            from,
            to,
            threshold,
            out,
        } => {
            let mut state = DashboardState::default();
            state.apply(DashboardEvent::SetYearRange(YearRange::new(from, to)));
            for (driver, value) in [
                (Driver::UrbanGrowth, drivers.urban_growth),
                (Driver::TrafficDensity, drivers.traffic_density),
                (Driver::IndustrialActivity, drivers.industrial_activity),
                (Driver::GreenSpaces, drivers.green_spaces),
                (Driver::NoisePolicy, drivers.noise_policy),
            ] {
                state.apply(DashboardEvent::SetDriver(driver, value));
            }
            if !locations.is_empty() {
                for current in state.locations.clone() {
                    if !locations.contains(&current) {
                        state.apply(DashboardEvent::DeselectLocation(current));
                    }
                }
                for location in locations {
                    state.apply(DashboardEvent::SelectLocation(location));
                }
            }

            let report = report::build_report(&dataset, &state, threshold, Utc::now().date_naive());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Config => {
            print_json(&config)?;
        }
    }

    Ok(())
}
