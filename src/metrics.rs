//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounterVec, IntGaugeVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kinotrack_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kinotrack_errors_total", "Total number of errors returned to clients"),
        &["error_type"]
    ).expect("metric can be created");

    // Catalog (metadata provider) Metrics
    pub static ref CATALOG_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kinotrack_catalog_requests_total", "Total number of catalog API requests"),
        &["operation", "status"]
    ).expect("metric can be created");
    pub static ref CATALOG_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "kinotrack_catalog_request_duration_seconds",
            "Catalog API request duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["operation"]
    ).expect("metric can be created");

    // Streaming-source Metrics
    pub static ref SOURCE_SEARCHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kinotrack_source_searches_total", "Total number of per-site streaming source searches"),
        &["source", "status"]
    ).expect("metric can be created");

    // Cache Metrics
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kinotrack_cache_hits_total", "Total number of cache hits"),
        &["cache_name"]
    ).expect("metric can be created");
    pub static ref CACHE_MISSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("kinotrack_cache_misses_total", "Total number of cache misses"),
        &["cache_name"]
    ).expect("metric can be created");
    pub static ref CACHE_SIZE: IntGaugeVec = IntGaugeVec::new(
        Opts::new("kinotrack_cache_size", "Current number of items in cache"),
        &["cache_name"]
    ).expect("metric can be created");
}

/// Register all metrics with the global registry
///
/// Must be called once at startup. Registration errors are logged
/// and ignored so a double call cannot take the process down.
pub fn init_metrics() {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(ERRORS_TOTAL.clone()),
        Box::new(CATALOG_REQUESTS_TOTAL.clone()),
        Box::new(CATALOG_REQUEST_DURATION_SECONDS.clone()),
        Box::new(SOURCE_SEARCHES_TOTAL.clone()),
        Box::new(CACHE_HITS_TOTAL.clone()),
        Box::new(CACHE_MISSES_TOTAL.clone()),
        Box::new(CACHE_SIZE.clone()),
    ];

    for metric in metrics {
        if let Err(error) = REGISTRY.register(metric) {
            tracing::warn!(%error, "Metric registration skipped");
        }
    }
}
