//! Metrics collection and exposition.
//!
//! # Metrics
//! - `honeytrap_requests_total` (counter): requests by method, status
//! - `honeytrap_request_duration_seconds` (histogram): handling latency
//! - `honeytrap_trap_hits_total` (counter): matched traps by path
//! - `honeytrap_token_hits_total` (counter): matched tokens by path, token
//! - `honeytrap_render_failures_total` (counter)
//! - `honeytrap_alerts_written_total` / `honeytrap_alert_write_errors_total`
//!
//! Trap and token labels come from the configuration, never from raw
//! request paths, so label cardinality stays bounded.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "honeytrap_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("honeytrap_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_trap_hit(path: &str, token: Option<&str>) {
    counter!("honeytrap_trap_hits_total", "path" => path.to_string()).increment(1);
    if let Some(token) = token {
        counter!(
            "honeytrap_token_hits_total",
            "path" => path.to_string(),
            "token" => token.to_string()
        )
        .increment(1);
    }
}

pub fn record_render_failure() {
    counter!("honeytrap_render_failures_total").increment(1);
}

pub fn record_alert_written(ok: bool) {
    if ok {
        counter!("honeytrap_alerts_written_total").increment(1);
    } else {
        counter!("honeytrap_alert_write_errors_total").increment(1);
    }
}
