//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// View section.
///
/// The serializable part of a view's configuration. Template functions are
/// code and are added through `ViewBuilder` instead.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use vista_config::ViewSettings;
///
/// let settings = ViewSettings {
///     template_dir: PathBuf::from("templates"),
///     default_template: "index.html".to_string(),
///     include_paths: vec![PathBuf::from("templates/partials")],
///     default_entry: String::new(),
///     strict_undefined: false,
/// };
/// assert!(settings.default_entry.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ViewSettings {
    /// Directory template names are resolved against.
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Template rendered when a handler names none. Empty means handlers
    /// must always name one.
    #[serde(default)]
    pub default_template: String,

    /// Directories whose files are loaded alongside every page.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Template executed instead of the page itself, e.g. a layout.
    #[serde(default)]
    pub default_entry: String,

    /// Fail rendering on any undefined value.
    #[serde(default)]
    pub strict_undefined: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            default_template: String::new(),
            include_paths: Vec::new(),
            default_entry: String::new(),
            strict_undefined: false,
        }
    }
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log filter directive (e.g. "info" or "vista_view=debug,warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,

    /// Prometheus scrape endpoint address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,

    /// Histogram bucket boundaries for render duration, in seconds.
    #[serde(default = "default_histogram_buckets")]
    pub histogram_buckets: Vec<f64>,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_metrics_addr(),
            histogram_buckets: default_histogram_buckets(),
        }
    }
}

fn default_metrics_addr() -> String {
    "127.0.0.1:9090".to_string()
}

fn default_histogram_buckets() -> Vec<f64> {
    vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySettings {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSettings,
}

fn default_true() -> bool {
    true
}
