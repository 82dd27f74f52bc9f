//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): by method, path, status
//! - `balancer_request_duration_seconds` (histogram): by method, path
//! - `balancer_requests_denied_total` (counter): firewall rejections
//!   by reason

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const REQUESTS_TOTAL: &str = "balancer_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "balancer_request_duration_seconds";
pub const REQUESTS_DENIED_TOTAL: &str = "balancer_requests_denied_total";

/// Install the Prometheus recorder and hand back the render handle for
/// the admin listener's /metrics endpoint.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(REQUESTS_TOTAL, "Total number of requests processed");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "Duration of proxied HTTP requests"
    );
    describe_counter!(
        REQUESTS_DENIED_TOTAL,
        "Requests rejected by the firewall"
    );

    Ok(handle)
}

/// Record one completed proxy attempt.
pub fn record_request(method: &str, path: &str, status: u16, started: Instant) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

/// Record one firewall rejection.
pub fn record_denied(reason: &'static str) {
    counter!(REQUESTS_DENIED_TOTAL, "reason" => reason).increment(1);
}
