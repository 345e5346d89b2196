//! Metrics collection and exposition.
//!
//! # Metrics
//! - `restconf_proxy_requests_total` (counter): proxied requests by method, status
//! - `restconf_proxy_request_duration_seconds` (histogram): latency by method
//! - `restconf_proxy_bytes_relayed_total` (counter): response body bytes
//! - `restconf_proxy_upstream_errors_total` (counter): transport failures by kind
//!
//! Without an installed exporter every macro is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

pub fn record_request(method: &str, status: u16, bytes: u64, elapsed: Duration) {
    counter!(
        "restconf_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("restconf_proxy_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
    counter!("restconf_proxy_bytes_relayed_total").increment(bytes);
}

pub fn record_upstream_failure(kind: &'static str) {
    counter!("restconf_proxy_upstream_errors_total", "kind" => kind).increment(1);
}
