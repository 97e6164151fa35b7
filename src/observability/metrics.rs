//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `breaker_transitions_total` (counter): state changes by target state
//! - `breaker_short_circuits_total` (counter): calls rejected while open
//! - `breaker_calls_total` (counter): admitted calls by outcome
//! - `fallback_activations_total` (counter): fallbacks by cause
//!
//! All recorders are no-ops until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_breaker_state(breaker: &str, state_value: f64) {
    gauge!("breaker_state", "breaker" => breaker.to_string()).set(state_value);
}

pub fn record_breaker_transition(breaker: &str, to: &'static str) {
    counter!("breaker_transitions_total", "breaker" => breaker.to_string(), "to" => to).increment(1);
}

pub fn record_short_circuit(breaker: &str) {
    counter!("breaker_short_circuits_total", "breaker" => breaker.to_string()).increment(1);
}

pub fn record_breaker_call(breaker: &str, outcome: &'static str) {
    counter!("breaker_calls_total", "breaker" => breaker.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_fallback(breaker: &str, cause: &'static str) {
    counter!("fallback_activations_total", "breaker" => breaker.to_string(), "cause" => cause).increment(1);
}
