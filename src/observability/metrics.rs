//! Metrics collection and exposition.
//!
//! # Metrics
//! - `host_guard_decisions_total` (counter): guard decisions by outcome
//! - `host_guard_denial_failures_total` (counter): denial policies that errored

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_decision(allowed: bool) {
    let outcome = if allowed { "allowed" } else { "denied" };
    ::metrics::counter!("host_guard_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_denial_failure() {
    ::metrics::counter!("host_guard_denial_failures_total").increment(1);
}
