//! Prometheus metrics.
//!
//! Installs the global `metrics` recorder that the view middleware reports
//! to, and serves it for scraping.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `vista_view_renders_total` | Counter | `outcome` | View invocations |
//! | `vista_view_render_duration_seconds` | Histogram | `outcome` | Render latency |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;

/// Counter of view invocations by outcome.
pub const VIEW_RENDERS_TOTAL: &str = "vista_view_renders_total";

/// Histogram of view render time.
pub const VIEW_RENDER_DURATION_SECONDS: &str = "vista_view_render_duration_seconds";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether to install the recorder.
    pub enabled: bool,

    /// Scrape endpoint address (e.g. "127.0.0.1:9090").
    pub addr: String,

    /// Histogram buckets for render duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: "127.0.0.1:9090".to_string(),
            duration_buckets: vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0],
        }
    }
}

/// Installs the Prometheus recorder and starts the scrape endpoint.
///
/// Must be called inside a Tokio runtime when enabled; the endpoint runs as
/// a spawned task.
///
/// # Errors
///
/// Returns `TelemetryError` if the address is invalid, there is no runtime,
/// or a global recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let (recorder, exporter) = builder(config)?
        .with_http_listener(addr)
        .build()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let handle = recorder.handle();

    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let _ = METRICS_HANDLE.set(handle);

    runtime.spawn(async move {
        if let Err(err) = exporter.await {
            tracing::error!(error = ?err, "Metrics exporter stopped");
        }
    });

    register_metric_descriptions();
    tracing::info!(%addr, "Serving Prometheus metrics");
    Ok(())
}

fn builder(config: &MetricsConfig) -> TelemetryResult<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(VIEW_RENDER_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Renders the global recorder in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        VIEW_RENDERS_TOTAL,
        "View middleware invocations, by outcome (rendered, error, skipped)"
    );
    describe_histogram!(
        VIEW_RENDER_DURATION_SECONDS,
        Unit::Seconds,
        "Time spent loading and executing templates"
    );
}
