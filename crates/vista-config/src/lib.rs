//! Typed configuration for Vista.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use vista_config::ConfigLoader;
//!
//! # fn main() -> Result<(), vista_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("vista.toml")?
//!     .with_env_prefix("VISTA")
//!     .load()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [view]
//! template_dir = "templates"
//! default_template = "index.html"
//! include_paths = ["templates/partials"]
//! default_entry = "layout.html"
//! strict_undefined = false
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "127.0.0.1:9090"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `VISTA__VIEW__TEMPLATE_DIR=views`
//! - `VISTA__VIEW__INCLUDE_PATHS=views/partials,views/layouts`
//! - `VISTA__TELEMETRY__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{VistaConfig, VistaConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingSettings, MetricsSettings, TelemetrySettings, ViewSettings};
