use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::FeedConfig;
use crate::models::{CityAverage, StationInfo, StationMonth};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("malformed csv header: {0}")]
    Csv(#[from] csv::Error),
}

/// Both station feeds. Empty when either feed could not be loaded.
#[derive(Debug, Clone, Default)]
pub struct ComparisonData {
    pub months: Vec<StationMonth>,
    pub stations: Vec<StationInfo>,
}

impl ComparisonData {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty() || self.stations.is_empty()
    }
}

/// Parses header-keyed CSV text. Rows that do not deserialize are dropped.
pub fn parse_csv<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    reader.headers()?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for result in reader.deserialize::<T>() {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => {
                dropped += 1;
                tracing::debug!(error = %err, "dropping malformed row");
            }
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, kept = rows.len(), "dropped malformed csv rows");
    }
    Ok(rows)
}

pub async fn fetch_csv<T: DeserializeOwned>(client: &Client, url: &str) -> Result<Vec<T>, FeedError> {
    let http = |source: reqwest::Error| FeedError::Http {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(http)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let text = response.text().await.map_err(http)?;
    parse_csv(&text)
}

async fn fetch_both(client: &Client, feeds: &FeedConfig) -> Result<ComparisonData, FeedError> {
    let months = fetch_csv::<StationMonth>(client, &feeds.station_month_url).await?;
    let stations = fetch_csv::<StationInfo>(client, &feeds.station_info_url).await?;
    Ok(ComparisonData { months, stations })
}

/// Loads the comparison feeds, degrading to empty data on any failure.
pub async fn load_comparison(client: &Client, feeds: &FeedConfig) -> ComparisonData {
    match fetch_both(client, feeds).await {
        Ok(data) => {
            tracing::info!(
                months = data.months.len(),
                stations = data.stations.len(),
                "loaded station feeds"
            );
            data
        }
        Err(err) => {
            tracing::warn!(error = %err, "station feeds unavailable, comparison left empty");
            ComparisonData::default()
        }
    }
}

#[derive(Default)]
struct CityAccumulator {
    day_total: f64,
    day_count: usize,
    night_total: f64,
    night_count: usize,
    day_limit: Option<f64>,
    night_limit: Option<f64>,
}

fn mean(total: f64, count: usize) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

/// Per-city day and night averages for `year`, restricted to `cities`.
/// Limits are taken from the first station row seen for each city.
pub fn compare_cities(data: &ComparisonData, year: i32, cities: &[String]) -> Vec<CityAverage> {
    let mut city_of: HashMap<&str, &str> = HashMap::new();
    for info in &data.stations {
        city_of
            .entry(info.station.as_str())
            .or_insert(info.city.as_str());
    }

    let mut by_city: IndexMap<&str, CityAccumulator> = IndexMap::new();
    for row in data.months.iter().filter(|m| m.year == year) {
        let Some(city) = city_of.get(row.station.as_str()).copied() else {
            continue;
        };
        if !cities.iter().any(|c| c == city) {
            continue;
        }

        let acc = by_city.entry(city).or_insert_with(|| CityAccumulator {
            day_limit: row.day_limit,
            night_limit: row.night_limit,
            ..Default::default()
        });
        if let Some(day) = row.day {
            acc.day_total += day;
            acc.day_count += 1;
        }
        if let Some(night) = row.night {
            acc.night_total += night;
            acc.night_count += 1;
        }
    }

    by_city
        .into_iter()
        .map(|(city, acc)| CityAverage {
            city: city.to_string(),
            avg_day: mean(acc.day_total, acc.day_count),
            avg_night: mean(acc.night_total, acc.night_count),
            day_limit: acc.day_limit,
            night_limit: acc.night_limit,
        })
        .collect()
}

pub fn available_cities(data: &ComparisonData) -> Vec<String> {
    let mut seen: IndexMap<&str, ()> = IndexMap::new();
    for info in &data.stations {
        seen.entry(info.city.as_str()).or_insert(());
    }
    seen.into_keys().map(str::to_string).collect()
}

pub fn available_years(data: &ComparisonData) -> Vec<i32> {
    data.months
        .iter()
        .map(|m| m.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONTHS: &str = "\
Station,Year,Month,Day,Night,DayLimit,NightLimit
MUM01,2018,1,68.0,60.0,65,55
MUM01,2018,2,70.0,62.0,65,55
MUM02,2018,1,72.0,,65,55
DEL01,2018,1,74.0,66.0,55,45
DEL01,2019,1,80.0,70.0,55,45
HYD01,2018,1,61.0,53.0,50,40
BAD01,not-a-year,1,61.0,53.0,50,40
";

    const STATIONS: &str = "\
Station,Name,City,State,Type
MUM01,Bandra,Mumbai,Maharashtra,Commercial
MUM02,Andheri,Mumbai,Maharashtra,Residential
DEL01,ITO,Delhi,Delhi,Commercial
HYD01,Abids,Hyderabad,Telangana,Silence
";

    fn data() -> ComparisonData {
        ComparisonData {
            months: parse_csv(MONTHS).unwrap(),
            stations: parse_csv(STATIONS).unwrap(),
        }
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn malformed_rows_are_dropped_and_blank_fields_absent() {
        let data = data();
        assert_eq!(data.months.len(), 6);
        let blank = data.months.iter().find(|m| m.station == "MUM02").unwrap();
        assert_eq!(blank.day, Some(72.0));
        assert_eq!(blank.night, None);
    }

    #[test]
    fn averages_selected_cities_for_year() {
        let result = compare_cities(&data(), 2018, &cities(&["Mumbai", "Delhi"]));
        assert_eq!(result.len(), 2);

        let mumbai = &result[0];
        assert_eq!(mumbai.city, "Mumbai");
        assert_eq!(mumbai.avg_day, Some(70.0));
        assert_eq!(mumbai.avg_night, Some(61.0));
        assert_eq!(mumbai.day_limit, Some(65.0));

        let delhi = &result[1];
        assert_eq!(delhi.city, "Delhi");
        assert_eq!(delhi.avg_day, Some(74.0));
        assert_eq!(delhi.night_limit, Some(45.0));
    }

    #[test]
    fn no_samples_means_no_average() {
        let data = ComparisonData {
            months: parse_csv("Station,Year,Month,Day,Night,DayLimit,NightLimit\nX1,2018,1,,,50,40\n")
                .unwrap(),
            stations: parse_csv("Station,Name,City,State,Type\nX1,Site,Pune,Maharashtra,Residential\n")
                .unwrap(),
        };
        let result = compare_cities(&data, 2018, &cities(&["Pune"]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].avg_day, None);
        assert_eq!(result[0].avg_night, None);
    }

    #[test]
    fn empty_feeds_compare_to_nothing() {
        let empty = ComparisonData::default();
        assert!(empty.is_empty());
        assert!(compare_cities(&empty, 2018, &cities(&["Mumbai"])).is_empty());
        assert!(available_cities(&empty).is_empty());
        assert!(available_years(&empty).is_empty());
    }

    #[test]
    fn lists_cities_and_years() {
        let data = data();
        assert_eq!(available_cities(&data), cities(&["Mumbai", "Delhi", "Hyderabad"]));
        assert_eq!(available_years(&data), vec![2018, 2019]);
    }

    #[tokio::test]
    async fn unreachable_feed_degrades_to_empty() {
        let feeds = FeedConfig {
            station_month_url: "http://127.0.0.1:9/station_month.csv".to_string(),
            station_info_url: "http://127.0.0.1:9/stations.csv".to_string(),
        };
        let data = load_comparison(&Client::new(), &feeds).await;
        assert!(data.is_empty());
    }

    /// Serves `response` to every connection on an ephemeral local port.
    async fn serve(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn error_status_is_reported_and_degrades_to_empty() {
        let base = serve(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 9\r\nconnection: close\r\n\r\nnot found",
        )
        .await;
        let client = Client::new();
        let url = format!("{base}/station_month.csv");

        match fetch_csv::<StationMonth>(&client, &url).await {
            Err(FeedError::Status { status, url: failed }) => {
                assert_eq!(status, 404);
                assert_eq!(failed, url);
            }
            other => panic!("expected a status error, got {other:?}"),
        }

        let feeds = FeedConfig {
            station_month_url: url,
            station_info_url: format!("{base}/stations.csv"),
        };
        assert!(load_comparison(&client, &feeds).await.is_empty());
    }

    #[tokio::test]
    async fn successful_feed_is_parsed() {
        let body = "Station,Name,City,State,Type\nMUM01,Bandra,Mumbai,Maharashtra,Commercial\n";
        let response: &'static str = Box::leak(
            format!(
                "HTTP/1.1 200 OK\r\ncontent-type: text/csv\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            )
            .into_boxed_str(),
        );
        let base = serve(response).await;
        let stations = fetch_csv::<StationInfo>(&Client::new(), &format!("{base}/stations.csv"))
            .await
            .unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].city, "Mumbai");
    }

    #[test]
    fn headerless_body_yields_no_rows() {
        let months: Vec<StationMonth> = parse_csv("").unwrap();
        assert!(months.is_empty());
        let data = ComparisonData {
            months,
            stations: parse_csv(STATIONS).unwrap(),
        };
        assert!(data.is_empty());
        assert!(compare_cities(&data, 2018, &cities(&["Mumbai"])).is_empty());
    }
}
