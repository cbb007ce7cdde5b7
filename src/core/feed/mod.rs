pub mod fetcher;
pub mod parser;
pub mod types;

use fetcher::{build_client, fetch_body, FetchError, FetcherConfig};
use parser::extract_with_policy;
use types::{BatchPolicy, EarthquakeRecord};

/// Fetches `url` and decodes it into earthquake records.
///
/// Transport failures are logged and produce an empty list.
pub async fn fetch_earthquake_data(
    client: &reqwest::Client,
    url: &str,
    policy: BatchPolicy,
) -> Vec<EarthquakeRecord> {
    let body = match fetch_body(client, url).await {
        Ok(body) => body,
        Err(FetchError::HttpStatus(code)) => {
            tracing::warn!(code, url, "error response code from earthquake feed");
            return Vec::new();
        }
        Err(error) => {
            tracing::error!(%error, url, "problem retrieving the earthquake feed");
            return Vec::new();
        }
    };
    extract_with_policy(Some(body.as_str()), policy)
}

/// Stateless earthquake feed service: a configured client plus a batch policy.
#[derive(Debug, Clone)]
pub struct QuakeFeed {
    client: reqwest::Client,
    policy: BatchPolicy,
}

impl QuakeFeed {
    pub fn new(config: &FetcherConfig, policy: BatchPolicy) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(config)?,
            policy,
        })
    }

    pub fn with_client(client: reqwest::Client, policy: BatchPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    pub async fn load(&self, url: &str) -> Vec<EarthquakeRecord> {
        fetch_earthquake_data(&self.client, url, self.policy).await
    }
}
