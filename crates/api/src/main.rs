//! Seabed Catalog API
//!
//! Serves the catalog under `/api`:
//! - Map filter lookups and the nested map-data document
//! - Analytics rollups and the station/block association job
//! - Gallery, library and sample listings
//! - Health checks and Prometheus metrics

mod extract;
mod handlers;
mod middleware;
mod routes;
mod shutdown;

use metrics_exporter_prometheus::PrometheusBuilder;
use seabed_common::{
    cache::Cache,
    config::{AppConfig, ObservabilityConfig},
    db::{schema, seed, DbPool},
    metrics,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub cache: Option<Arc<Cache>>,
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Arc::new(AppConfig::load()?);

    init_tracing(&config.observability);

    info!(
        version = seabed_common::VERSION,
        service = %config.observability.service_name,
        "Starting Seabed Catalog API"
    );

    // Prometheus exposition on its own port
    let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
    PrometheusBuilder::new()
        .set_buckets(metrics::LATENCY_BUCKETS)?
        .with_http_listener(metrics_addr)
        .install()?;
    metrics::register_metrics();
    info!(%metrics_addr, "Metrics exporter listening");

    // Database, schema and seed data
    let db = DbPool::new(&config.database).await?;
    schema::create_all(db.write()).await?;

    if config.database.seed_on_startup {
        let catalog = seed::SeedCatalog::bundled()?;
        let inserted = seed::seed_if_empty(db.write(), &catalog).await?;
        if inserted == 0 {
            info!("Catalog already populated, skipping seed");
        }
    }

    // Cache is optional; failures to connect only disable it
    let cache = match Cache::connect(&config.cache).await {
        Ok(cache) => cache.map(Arc::new),
        Err(e) => {
            warn!(error = %e, "Redis unavailable, summaries will be computed per request");
            None
        }
    };

    let http = reqwest::Client::builder()
        .timeout(config.storage.download_timeout())
        .build()?;

    let state = AppState {
        config: config.clone(),
        db,
        cache,
        http,
    };

    let app = routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (stopping_tx, stopping_rx) = oneshot::channel();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown::shutdown_signal().await;
            let _ = stopping_tx.send(());
        })
        .into_future();

    match shutdown::drain_within(server, stopping_rx, config.shutdown_timeout()).await {
        Some(result) => result?,
        None => warn!(
            timeout_secs = config.server.shutdown_timeout_secs,
            "Shutdown timeout elapsed, dropping open connections"
        ),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}
