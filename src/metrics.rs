//! Prometheus metrics for request outcomes and latency.
//!
//! This module provides metrics for:
//! - Requests served, by route and status
//! - Request latency, by route
//! - Failures normalized, by kind
//! - Handler panics caught at the capture boundary

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::{debug, info};

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// Normalized failures counter metric name.
pub const METRIC_HANDLER_FAILURES: &str = "handler_failures_total";
/// Caught panics counter metric name.
pub const METRIC_HANDLER_PANICS: &str = "handler_panics_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");
    describe_counter!(
        METRIC_HANDLER_FAILURES,
        "Total number of failures turned into error envelopes"
    );
    describe_counter!(
        METRIC_HANDLER_PANICS,
        "Total number of handler panics caught"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter on its own listener.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Record one served request.
pub fn record_request(start: Instant, route: &'static str, status: u16) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "route" => route).record(latency_ms);
    counter!(METRIC_HTTP_REQUESTS, "route" => route, "status" => status.to_string()).increment(1);
}

/// Increment the normalized failures counter.
pub fn inc_handler_failures(kind: &'static str) {
    counter!(METRIC_HANDLER_FAILURES, "kind" => kind).increment(1);
}

/// Increment the caught panics counter.
pub fn inc_handler_panics() {
    counter!(METRIC_HANDLER_PANICS).increment(1);
}
