//! Main configuration types.
//!
//! This module provides the top-level [`VistaConfig`] struct and its builder.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use vista_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};

use crate::{ConfigError, LogFormat, TelemetrySettings, ViewSettings};

/// Complete Vista configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use vista_config::VistaConfig;
///
/// let config = VistaConfig::default();
/// assert_eq!(config.view.template_dir.to_str(), Some("templates"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct VistaConfig {
    /// View configuration.
    #[serde(default)]
    pub view: ViewSettings,

    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl VistaConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> VistaConfigBuilder {
        VistaConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A template name is an absolute path
    /// - An include path is empty
    /// - The log level is empty
    /// - Metrics are enabled with an invalid address or unsorted buckets
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, name) in [
            ("view.default_template", &self.view.default_template),
            ("view.default_entry", &self.view.default_entry),
        ] {
            if Path::new(name).is_absolute() {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("template name must be relative: {name}"),
                ));
            }
        }

        if self
            .view
            .include_paths
            .iter()
            .any(|p| p.as_os_str().is_empty())
        {
            return Err(ConfigError::invalid_value(
                "view.include_paths",
                "include path must not be empty",
            ));
        }

        if self.telemetry.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.logging.level",
                "must not be empty",
            ));
        }

        let metrics = &self.telemetry.metrics;
        if metrics.enabled {
            if metrics.addr.parse::<SocketAddr>().is_err() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.addr",
                    format!("invalid socket address: {}", metrics.addr),
                ));
            }
            if metrics.histogram_buckets.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.histogram_buckets",
                    "buckets must be strictly increasing",
                ));
            }
        }

        Ok(())
    }

    /// Development preset: pretty debug logs with source locations, and
    /// strict undefined handling so template typos fail loudly.
    ///
    /// ```
    /// use vista_config::VistaConfig;
    ///
    /// let config = VistaConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// assert!(config.view.strict_undefined);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;

        config.view.strict_undefined = true;

        config
    }

    /// Production preset: JSON logs at info level with metrics enabled.
    ///
    /// ```
    /// use vista_config::{LogFormat, VistaConfig};
    ///
    /// let config = VistaConfig::production();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    /// assert!(config.telemetry.metrics.enabled);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.include_location = false;

        config.telemetry.metrics.enabled = true;

        config
    }

    /// Converts the telemetry section into the telemetry crate's config.
    #[must_use]
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::from(&self.telemetry)
    }
}

impl From<&TelemetrySettings> for TelemetryConfig {
    fn from(settings: &TelemetrySettings) -> Self {
        let logging = &settings.logging;
        let metrics = &settings.metrics;
        Self {
            logging: LogConfig {
                enabled: logging.enabled,
                level: logging.level.clone(),
                json_format: logging.format == LogFormat::Json,
                file_line_info: logging.include_location,
                ..LogConfig::default()
            },
            metrics: MetricsConfig {
                enabled: metrics.enabled,
                addr: metrics.addr.clone(),
                duration_buckets: metrics.histogram_buckets.clone(),
            },
        }
    }
}

/// Builder for [`VistaConfig`].
#[derive(Debug, Default)]
pub struct VistaConfigBuilder {
    view: Option<ViewSettings>,
    telemetry: Option<TelemetrySettings>,
}

impl VistaConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the view configuration.
    #[must_use]
    pub fn view(mut self, view: ViewSettings) -> Self {
        self.view = Some(view);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySettings) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> VistaConfig {
        VistaConfig {
            view: self.view.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<VistaConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
