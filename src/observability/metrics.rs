//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rewrite_requests_total` (counter): requests by outcome (passthrough, rewritten, redirect)
//! - `rewrite_rule_hits_total` (counter): applied rewrites by rule pattern
//! - `rewrite_upstream_requests_total` (counter): forwarded requests by status
//! - `rewrite_upstream_duration_seconds` (histogram): upstream latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter on `addr`. Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!("rewrite_requests_total", "Requests seen by the rewrite chain");
    metrics::describe_counter!("rewrite_rule_hits_total", "Requests rewritten, by rule");
    metrics::describe_counter!(
        "rewrite_upstream_requests_total",
        "Requests forwarded upstream, by status"
    );
    metrics::describe_histogram!(
        "rewrite_upstream_duration_seconds",
        "Time spent waiting on the upstream"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record the outcome of one chain evaluation.
pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("rewrite_requests_total", "outcome" => outcome).increment(1);
}

/// Record a request rewritten by the rule with `pattern`.
pub fn record_rule_hit(pattern: &str) {
    metrics::counter!("rewrite_rule_hits_total", "rule" => pattern.to_string()).increment(1);
}

/// Record a forwarded request.
pub fn record_upstream(status: u16, start: Instant) {
    metrics::counter!("rewrite_upstream_requests_total", "status" => status.to_string())
        .increment(1);
    metrics::histogram!("rewrite_upstream_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}
