//! Metrics collection and exposition.
//!
//! # Metrics
//! - `refiner_route_requests_total` (counter): route requests by outcome
//! - `refiner_route_request_duration_seconds` (histogram)
//! - `refiner_probes_total` (counter): probes by outcome (obstacle, clear, failed)
//! - `refiner_sessions_total` (counter): finished sessions by status
//! - `refiner_session_attempts` (histogram): iterations used per session
//! - `refiner_session_duration_seconds` (histogram)
//! - `refiner_stored_sessions` (gauge)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_route_request(outcome: &'static str, start: Instant) {
    metrics::counter!("refiner_route_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("refiner_route_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_probe(outcome: &'static str) {
    metrics::counter!("refiner_probes_total", "outcome" => outcome).increment(1);
}

pub fn record_session(status: &'static str, attempts: u32, start: Instant) {
    metrics::counter!("refiner_sessions_total", "status" => status).increment(1);
    metrics::histogram!("refiner_session_attempts").record(f64::from(attempts));
    metrics::histogram!("refiner_session_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_stored_sessions(count: usize) {
    metrics::gauge!("refiner_stored_sessions").set(count as f64);
}
