//! Fetches USGS GeoJSON earthquake feeds and decodes them into typed records.

mod core;
pub mod logging;

pub use crate::core::config::{load_env_file, load_env_from, ConfigError, OrderBy, QueryConfig};
pub use crate::core::feed::fetcher::{build_client, fetch_body, FetchError, FetcherConfig};
pub use crate::core::feed::parser::{extract, extract_with_policy, parse_feed, FeedParseError};
pub use crate::core::feed::types::{BatchPolicy, EarthquakeRecord, ExtractedFeed, FeatureError};
pub use crate::core::feed::{fetch_earthquake_data, QuakeFeed};
pub use crate::core::loader::spawn_load;
