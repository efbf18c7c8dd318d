//! Seabed Catalog export client
//!
//! Fetches the map-data document from a running API with the configured
//! filters and writes it as sectioned CSV or a GeoJSON FeatureCollection.
//!
//! Usage: `seabed-export [output-path]`, everything else via `EXPORT__*`.

mod client;
mod config;
mod output;

use crate::client::CatalogClient;
use crate::config::ExportConfig;
use anyhow::Context;
use seabed_common::VERSION;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = ExportConfig::load().context("Failed to load export configuration")?;
    if let Some(path) = std::env::args().nth(1) {
        config.output = Some(path.into());
    }

    init_tracing(&config);
    info!(version = VERSION, api = %config.api_base_url, "Starting Seabed Catalog export");

    let start = Instant::now();
    let client = CatalogClient::new(&config)?;
    let data = client
        .fetch_map_data(&config.filters)
        .await
        .context("Failed to fetch map data")?;

    info!(
        contractors = data.summary.contractors,
        stations = data.summary.stations,
        samples = data.summary.samples,
        "Map data received"
    );

    let rendered = output::render(&data, config.format)?;
    let path = config.output_path();
    tokio::fs::write(&path, rendered.body.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    for (section, rows) in &rendered.counts {
        info!(section = %section, rows, "Exported");
    }

    info!(
        format = config.format.as_str(),
        path = %path.display(),
        bytes = rendered.body.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Export complete"
    );

    Ok(())
}

fn init_tracing(config: &ExportConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
