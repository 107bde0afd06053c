use serde::Serialize;

pub const ENV_API_BASE_URL: &str = "NOISE_API_BASE_URL";
pub const ENV_STATION_MONTH_URL: &str = "NOISE_STATION_MONTH_URL";
pub const ENV_STATION_INFO_URL: &str = "NOISE_STATION_INFO_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_STATION_MONTH_URL: &str =
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/station_month-cKkiBjygcBGuMpUFscc1HzjzRyJdnQ.csv";
pub const DEFAULT_STATION_INFO_URL: &str =
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/stations-8E7CcSNYZkfaunhj69PmV1lpdkyYwW.csv";

/// Palghar town centre.
pub const DEFAULT_MAP_CENTER: (f64, f64) = (19.6967, 72.7699);
pub const DEFAULT_MAP_ZOOM: u8 = 11;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapConfig {
    pub center: (f64, f64),
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedConfig {
    pub station_month_url: String,
    pub station_info_url: String,
}

/// Settings handed to the map, API and feed collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    pub map: MapConfig,
    pub feeds: FeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
            },
            map: MapConfig {
                center: DEFAULT_MAP_CENTER,
                zoom: DEFAULT_MAP_ZOOM,
            },
            feeds: FeedConfig {
                station_month_url: DEFAULT_STATION_MONTH_URL.to_string(),
                station_info_url: DEFAULT_STATION_INFO_URL.to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let mut config = Self::default();
        config.api.base_url = value(ENV_API_BASE_URL, DEFAULT_API_BASE_URL);
        config.feeds.station_month_url = value(ENV_STATION_MONTH_URL, DEFAULT_STATION_MONTH_URL);
        config.feeds.station_info_url = value(ENV_STATION_INFO_URL, DEFAULT_STATION_INFO_URL);
        config
    }
}
