//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_rewrite_requests_total` (counter): rewrites by host_kind
//! - `edge_rewrite_failures_total` (counter): failed rewrites by reason
//! - `edge_rewrite_origin_requests_total` (counter): origin responses by status
//! - `edge_rewrite_origin_duration_seconds` (histogram): origin round-trip latency
//!
//! Recording is a no-op until a recorder is installed, so library callers
//! and tests pay nothing when the exporter is disabled.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::rewrite::HostKind;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_rewrite(host_kind: HostKind) {
    metrics::counter!("edge_rewrite_requests_total", "host_kind" => host_kind.as_str())
        .increment(1);
}

pub fn record_failure(reason: &'static str) {
    metrics::counter!("edge_rewrite_failures_total", "reason" => reason).increment(1);
}

pub fn record_origin(status: u16, start: Instant) {
    metrics::counter!("edge_rewrite_origin_requests_total", "status" => status.to_string())
        .increment(1);
    metrics::histogram!("edge_rewrite_origin_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}
