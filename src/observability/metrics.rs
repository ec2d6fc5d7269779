//! Metrics collection and exposition.
//!
//! # Metrics
//! - `resolver_fetch_attempts_total` (counter): store reads by outcome
//!   (resolved, unresolved, fault)
//! - `resolver_resolutions_total` (counter): caller results by outcome
//!   (resolved, deferred, failed)
//! - `resolver_tasks_in_flight` (gauge): live retry loops
//! - `resolver_task_attempts` (histogram): attempts needed to resolve
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_fetch_attempt(outcome: &'static str) {
    counter!("resolver_fetch_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_resolution(outcome: &'static str) {
    counter!("resolver_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn set_tasks_in_flight(count: usize) {
    gauge!("resolver_tasks_in_flight").set(count as f64);
}

pub fn record_task_attempts(attempts: u32) {
    histogram!("resolver_task_attempts").record(attempts as f64);
}
