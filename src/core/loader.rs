use tokio::task::JoinHandle;

use super::feed::types::EarthquakeRecord;
use super::feed::QuakeFeed;

/// Runs a feed load on the tokio runtime, off the caller's task.
///
/// Resolves to `None` without touching the network when no url was given.
pub fn spawn_load(
    feed: QuakeFeed,
    url: Option<String>,
) -> JoinHandle<Option<Vec<EarthquakeRecord>>> {
    tokio::spawn(async move {
        let url = url?;
        let records = feed.load(&url).await;
        tracing::info!(count = records.len(), %url, "loaded earthquakes");
        Some(records)
    })
}
