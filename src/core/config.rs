use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::feed::fetcher::FetcherConfig;

pub const DEFAULT_BASE_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";
pub const DEFAULT_MIN_MAGNITUDE: f64 = 6.0;
pub const DEFAULT_LIMIT: u32 = 10;

const ENV_FILE: &str = ".env.local";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Time,
    Magnitude,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Magnitude => "magnitude",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "magnitude" => Ok(Self::Magnitude),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Query parameters for the USGS event endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryConfig {
    pub base_url: String,
    pub min_magnitude: f64,
    pub order_by: OrderBy,
    pub limit: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            order_by: OrderBy::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QueryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            base_url: lookup("QUAKE_FEED_BASE_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.base_url),
            min_magnitude: parse_var(&lookup, "QUAKE_FEED_MIN_MAGNITUDE")?
                .unwrap_or(defaults.min_magnitude),
            order_by: parse_var(&lookup, "QUAKE_FEED_ORDER_BY")?.unwrap_or(defaults.order_by),
            limit: parse_var(&lookup, "QUAKE_FEED_LIMIT")?.unwrap_or(defaults.limit),
        })
    }

    pub fn request_url(&self) -> Result<String, ConfigError> {
        let mut url = url::Url::parse(self.base_url.trim())?;
        url.query_pairs_mut()
            .clear()
            .append_pair("format", "geojson")
            .append_pair("orderby", self.order_by.as_str())
            .append_pair("minmag", &self.min_magnitude.to_string())
            .append_pair("limit", &self.limit.to_string());
        Ok(url.into())
    }
}

impl FetcherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let connect_timeout = parse_var::<u64>(&lookup, "QUAKE_FEED_CONNECT_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.connect_timeout);
        let read_timeout = parse_var::<u64>(&lookup, "QUAKE_FEED_READ_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.read_timeout);
        Ok(Self {
            connect_timeout,
            read_timeout,
            ..defaults
        })
    }
}

/// Loads `.env.local` from the working directory if present.
///
/// Variables already set in the process environment win over the file.
pub fn load_env_file() -> Result<(), dotenvy::Error> {
    load_env_from(ENV_FILE)
}

pub fn load_env_from(path: impl AsRef<Path>) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(error) if error.not_found() => Ok(()),
        Err(error) => Err(error),
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    if value.trim().is_empty() {
        return Ok(None);
    }
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
