//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all catalog metrics
pub const METRICS_PREFIX: &str = "seabed";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 500ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms - P99 target
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Map data metrics
    describe_histogram!(
        format!("{}_map_data_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Map data aggregation latency in seconds"
    );

    describe_gauge!(
        format!("{}_map_data_contractors", METRICS_PREFIX),
        Unit::Count,
        "Contractors returned by the last map data load"
    );

    describe_gauge!(
        format!("{}_map_data_samples", METRICS_PREFIX),
        Unit::Count,
        "Samples returned by the last map data load"
    );

    // Association metrics
    describe_counter!(
        format!("{}_association_runs_total", METRICS_PREFIX),
        Unit::Count,
        "Station/block association runs"
    );

    describe_counter!(
        format!("{}_stations_assigned_total", METRICS_PREFIX),
        Unit::Count,
        "Stations assigned to a block"
    );

    describe_gauge!(
        format!("{}_stations_unmatched", METRICS_PREFIX),
        Unit::Count,
        "Unassigned stations outside every block after the last run"
    );

    describe_histogram!(
        format!("{}_association_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Association run latency in seconds"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a map data load
pub fn record_map_data(duration_secs: f64, contractors: usize, samples: usize, filtered: bool) {
    let scope = if filtered { "filtered" } else { "full" };

    histogram!(
        format!("{}_map_data_duration_seconds", METRICS_PREFIX),
        "scope" => scope
    )
    .record(duration_secs);

    gauge!(format!("{}_map_data_contractors", METRICS_PREFIX), "scope" => scope).set(contractors as f64);
    gauge!(format!("{}_map_data_samples", METRICS_PREFIX), "scope" => scope).set(samples as f64);
}

/// Helper to record an association run
pub fn record_association(duration_secs: f64, assigned: usize, unmatched: usize) {
    counter!(format!("{}_association_runs_total", METRICS_PREFIX)).increment(1);
    counter!(format!("{}_stations_assigned_total", METRICS_PREFIX)).increment(assigned as u64);
    gauge!(format!("{}_stations_unmatched", METRICS_PREFIX)).set(unmatched as f64);
    histogram!(format!("{}_association_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    if hit {
        counter!(
            format!("{}_cache_hits_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    } else {
        counter!(
            format!("{}_cache_misses_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    }
}
