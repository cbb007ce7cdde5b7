use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::{BatchPolicy, EarthquakeRecord, ExtractedFeed, FeatureError};

#[derive(Debug, thiserror::Error)]
pub enum FeedParseError {
    #[error("feed payload is empty")]
    EmptyPayload,
    #[error("geojson parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed has no `features` array")]
    MissingFeatures,
    #[error("feed `features` is not an array")]
    FeaturesNotArray,
}

#[derive(Debug, Clone, Deserialize)]
struct QuakeProperties {
    mag: f64,
    place: String,
    time: i64,
    url: String,
}

/// Decodes a GeoJSON earthquake feed.
///
/// Structural problems with the document fail the whole call. Problems inside
/// a single feature are collected in [`ExtractedFeed::rejected`] and handled
/// according to `policy`.
pub fn parse_feed(body: &str, policy: BatchPolicy) -> Result<ExtractedFeed, FeedParseError> {
    let trimmed = body.trim_start_matches('\u{FEFF}').trim();
    if trimmed.is_empty() {
        return Err(FeedParseError::EmptyPayload);
    }

    let mut document: Map<String, Value> = serde_json::from_str(trimmed)?;
    let features = match document.remove("features") {
        Some(Value::Array(features)) => features,
        Some(_) => return Err(FeedParseError::FeaturesNotArray),
        None => return Err(FeedParseError::MissingFeatures),
    };

    let mut extracted = ExtractedFeed {
        records: Vec::with_capacity(features.len()),
        rejected: Vec::new(),
    };
    for (index, feature) in features.into_iter().enumerate() {
        match record_from_feature(index, feature) {
            Ok(record) => extracted.records.push(record),
            Err(error) => {
                tracing::warn!(%error, ?policy, "malformed earthquake feature");
                extracted.rejected.push(error);
                if policy == BatchPolicy::Truncate {
                    break;
                }
            }
        }
    }

    tracing::debug!(
        records = extracted.records.len(),
        rejected = extracted.rejected.len(),
        "parsed earthquake feed"
    );
    Ok(extracted)
}

/// Returns the records in `body`, truncating at the first malformed feature.
///
/// A missing or empty body yields an empty list, as does a structurally
/// invalid document. Failures are logged rather than returned; use
/// [`parse_feed`] to branch on them.
pub fn extract(body: Option<&str>) -> Vec<EarthquakeRecord> {
    extract_with_policy(body, BatchPolicy::Truncate)
}

pub fn extract_with_policy(body: Option<&str>, policy: BatchPolicy) -> Vec<EarthquakeRecord> {
    let Some(body) = body else {
        return Vec::new();
    };
    match parse_feed(body, policy) {
        Ok(feed) => feed.records,
        Err(FeedParseError::EmptyPayload) => Vec::new(),
        Err(error) => {
            tracing::error!(%error, "problem parsing the earthquake feed");
            Vec::new()
        }
    }
}

fn record_from_feature(index: usize, feature: Value) -> Result<EarthquakeRecord, FeatureError> {
    let Value::Object(mut feature) = feature else {
        return Err(feature_error(index, ".", "feature is not a JSON object"));
    };
    let properties = match feature.remove("properties") {
        Some(Value::Object(properties)) => properties,
        Some(_) => return Err(feature_error(index, "properties", "expected a JSON object")),
        None => return Err(feature_error(index, ".", "missing field `properties`")),
    };

    let properties: QuakeProperties =
        serde_path_to_error::deserialize(Value::Object(properties)).map_err(|error| {
            let path = match error.path().to_string() {
                inner if inner == "." => "properties".to_string(),
                inner => format!("properties.{inner}"),
            };
            feature_error(index, &path, &error.into_inner().to_string())
        })?;

    Ok(EarthquakeRecord::new(
        properties.mag,
        properties.place,
        properties.time,
        properties.url,
    ))
}

fn feature_error(index: usize, path: &str, message: &str) -> FeatureError {
    FeatureError {
        index,
        path: path.to_string(),
        message: message.to_string(),
    }
}
