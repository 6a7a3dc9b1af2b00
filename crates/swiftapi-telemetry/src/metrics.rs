//! Prometheus metrics for SwiftAPI.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `swiftapi_requests_total` | Counter | `operation`, `status` | Total requests |
//! | `swiftapi_request_duration_seconds` | Histogram | `operation` | Request latency |
//! | `swiftapi_in_flight_requests` | Gauge | - | In-flight requests |
//! | `swiftapi_authz_denials_total` | Counter | `operation`, `reason` | Rejected requests |
//!
//! Recording before [`init_metrics`] is a no-op, so the dispatcher records
//! unconditionally. The recorder renders text exposition through the
//! returned handle; serving it is left to the host.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use swiftapi_telemetry::metrics::{init_metrics, record_request, MetricsConfig};
//!
//! let handle = init_metrics(&MetricsConfig::default()).unwrap();
//! record_request("orders_list", 200, Duration::from_millis(12));
//! println!("{}", handle.render());
//! ```

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "swiftapi_requests_total";
/// Request latency histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "swiftapi_request_duration_seconds";
/// In-flight gauge name.
pub const IN_FLIGHT_REQUESTS: &str = "swiftapi_in_flight_requests";
/// Authorization denial counter name.
pub const AUTHZ_DENIALS_TOTAL: &str = "swiftapi_authz_denials_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the global Prometheus recorder.
///
/// Calling this again returns the handle installed by the first call.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsDisabled` when `config.enabled` is false
/// and `TelemetryError::MetricsInit` if the recorder cannot be installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<PrometheusHandle> {
    if !config.enabled {
        return Err(TelemetryError::MetricsDisabled);
    }
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = METRICS_HANDLE.get_or_init(|| handle).clone();
    register_metric_descriptions();
    Ok(handle)
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Request duration in seconds");
    describe_gauge!(IN_FLIGHT_REQUESTS, "Number of requests currently being dispatched");
    describe_counter!(AUTHZ_DENIALS_TOTAL, "Requests rejected by authorization");
}

/// Records a completed request.
pub fn record_request(operation: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a request rejected by authorization.
///
/// `reason` is a short label such as `unauthenticated` or `role`.
pub fn record_authz_denial(operation: &str, reason: &'static str) {
    counter!(
        AUTHZ_DENIALS_TOTAL,
        "operation" => operation.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// Guard that tracks one in-flight request.
///
/// The gauge is decremented on drop, including when the request future is
/// cancelled.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}
