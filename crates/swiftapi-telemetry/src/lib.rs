//! Observability for SwiftAPI services.
//!
//! - **Logging**: structured JSON or pretty output through
//!   `tracing-subscriber`, see [`logging`].
//! - **Metrics**: request counters and latency histograms through the
//!   `metrics` facade with a Prometheus recorder, see [`metrics`].
//!
//! The dispatcher emits both regardless of whether they are initialized;
//! without a subscriber or recorder the calls are no-ops.
//!
//! # Example
//!
//! ```rust,no_run
//! use swiftapi_telemetry::{init_telemetry, LogConfig, MetricsConfig};
//!
//! let handle = init_telemetry(&LogConfig::development(), &MetricsConfig::default()).unwrap();
//! assert!(handle.is_some());
//! ```

#![doc(html_root_url = "https://docs.rs/swiftapi-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{fields, init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, record_request, InFlightGuard, MetricsConfig};
pub use metrics_exporter_prometheus::PrometheusHandle;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging and, when enabled, metrics.
///
/// Returns the Prometheus handle if metrics were installed.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(
    logging: &LogConfig,
    metrics: &MetricsConfig,
) -> TelemetryResult<Option<PrometheusHandle>> {
    init_logging(logging)?;
    if !metrics.enabled {
        return Ok(None);
    }
    init_metrics(metrics).map(Some)
}
