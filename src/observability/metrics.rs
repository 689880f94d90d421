//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_forward_requests_total` (counter): relayed requests by method, status
//! - `gateway_forward_duration_seconds` (histogram): time to upstream response head
//! - `gateway_forward_failures_total` (counter): upstream unreachable, by method
//! - `gateway_guard_decisions_total` (counter): proceed / redirect decisions
//! - `gateway_advisory_checks_total` (counter): release check outcomes
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a request relayed to the upstream.
pub fn record_forward(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_forward_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_forward_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a request that never reached the upstream.
pub fn record_forward_failure(method: &str) {
    metrics::counter!("gateway_forward_failures_total", "method" => method.to_string()).increment(1);
}

/// Record a session guard decision.
pub fn record_guard_decision(decision: &'static str) {
    metrics::counter!("gateway_guard_decisions_total", "decision" => decision).increment(1);
}

/// Record the outcome of a release check.
pub fn record_advisory_check(outcome: &'static str) {
    metrics::counter!("gateway_advisory_checks_total", "outcome" => outcome).increment(1);
}
