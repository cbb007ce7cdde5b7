use std::io::Write;

use anyhow::Context;
use clap::Parser;
use quake_feed::{
    load_env_file, logging, spawn_load, BatchPolicy, FetcherConfig, OrderBy, QuakeFeed,
    QueryConfig,
};

/// Print recent earthquakes from a USGS GeoJSON feed as JSON lines.
#[derive(Parser, Debug)]
#[command(name = "quake-feed", version, about)]
struct Cli {
    /// Feed url; overrides the query built from the other options.
    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    min_magnitude: Option<f64>,

    /// `time` or `magnitude`.
    #[arg(long)]
    order_by: Option<OrderBy>,

    #[arg(long)]
    limit: Option<u32>,

    /// Drop malformed features instead of stopping at the first one.
    #[arg(long)]
    skip_malformed: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env_file = load_env_file();
    logging::init(&cli.log_level);
    if let Err(error) = env_file {
        tracing::warn!(%error, "failed to load .env.local");
    }

    let url = match cli.url {
        Some(url) => url,
        None => {
            let mut query = QueryConfig::from_env()?;
            if let Some(min_magnitude) = cli.min_magnitude {
                query.min_magnitude = min_magnitude;
            }
            if let Some(order_by) = cli.order_by {
                query.order_by = order_by;
            }
            if let Some(limit) = cli.limit {
                query.limit = limit;
            }
            query.request_url()?
        }
    };

    let policy = if cli.skip_malformed {
        BatchPolicy::SkipMalformed
    } else {
        BatchPolicy::Truncate
    };
    let feed = QuakeFeed::new(&FetcherConfig::from_env()?, policy)
        .context("failed to create HTTP client")?;

    let records = spawn_load(feed, Some(url))
        .await
        .context("feed loader task failed")?
        .unwrap_or_default();
    if records.is_empty() {
        tracing::info!("no earthquakes found");
    }

    let mut stdout = std::io::stdout().lock();
    for record in &records {
        serde_json::to_writer(&mut stdout, record)?;
        writeln!(stdout)?;
    }
    Ok(())
}
