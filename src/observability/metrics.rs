//! Metrics collection and exposition.
//!
//! # Metrics
//! - `host_requests_total` (counter): requests by site and status
//! - `host_request_duration_seconds` (histogram): latency by site
//! - `host_unroutable_total` (counter): requests no site accepted
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "host_requests_total";
pub const REQUEST_DURATION: &str = "host_request_duration_seconds";
pub const UNROUTABLE_TOTAL: &str = "host_unroutable_total";

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(site: &str, status: u16, start: Instant) {
    metrics::counter!(REQUESTS_TOTAL, "site" => site.to_string(), "status" => status.to_string()).increment(1);
    metrics::histogram!(REQUEST_DURATION, "site" => site.to_string()).record(start.elapsed().as_secs_f64());
}

/// Record a request that matched no site.
pub fn record_unroutable() {
    metrics::counter!(UNROUTABLE_TOTAL).increment(1);
}
