//! Metrics collection and exposition.
//!
//! # Metrics
//! - `explorer_requests_total` (counter): requests by endpoint, status
//! - `explorer_request_duration_seconds` (histogram): handling latency by endpoint
//! - `explorer_active_connections` (gauge): registered connections
//! - `explorer_rejected_connections_total` (counter): accept-time rejections by reason
//! - `explorer_listener_restarts_total` (counter): bind/accept failures
//! - `explorer_acl_entries` (gauge): size of the ACL allow-set
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "explorer_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("explorer_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn connection_opened() {
    metrics::gauge!("explorer_active_connections").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("explorer_active_connections").decrement(1.0);
}

pub fn record_rejected_connection(reason: &'static str) {
    metrics::counter!("explorer_rejected_connections_total", "reason" => reason).increment(1);
}

pub fn record_listener_restart() {
    metrics::counter!("explorer_listener_restarts_total").increment(1);
}

pub fn record_acl_entries(count: usize) {
    metrics::gauge!("explorer_acl_entries").set(count as f64);
}
