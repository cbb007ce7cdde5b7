use serde::{Deserialize, Serialize};

/// One earthquake event decoded from a feed feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarthquakeRecord {
    magnitude: f64,
    location: String,
    time: i64,
    url: String,
}

impl EarthquakeRecord {
    pub fn new(magnitude: f64, location: String, time: i64, url: String) -> Self {
        Self {
            magnitude,
            location,
            time,
            url,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Free-text place, e.g. `"5km N of Cairo, Egypt"`.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Occurrence time in UTC epoch milliseconds.
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What to do when a single feature cannot be decoded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Stop at the first bad feature and keep everything decoded before it.
    #[default]
    Truncate,
    /// Drop only the bad feature and keep going.
    SkipMalformed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureError {
    pub index: usize,
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for FeatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "feature {} rejected at `{}`: {}",
            self.index, self.path, self.message
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFeed {
    pub records: Vec<EarthquakeRecord>,
    pub rejected: Vec<FeatureError>,
}

impl ExtractedFeed {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}
