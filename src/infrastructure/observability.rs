//! Prometheus metrics recorder and gateway metric helpers

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder. Call once at startup; the
/// returned handle renders the exposition text for `/metrics`.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Record an HTTP request metric
///
/// `route` must be a bounded label (the matched route pattern, a gateway
/// self-endpoint, or `unmatched`) — never the raw request path.
pub fn record_http_request(method: &str, route: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("gateway_upstream_errors_total", &labels).increment(1);
    }
}

/// Record a rejected acquisition for a rate-limit zone
pub fn record_rate_limited(zone: &str) {
    counter!("gateway_rate_limited_total", "zone" => zone.to_string()).increment(1);
}
