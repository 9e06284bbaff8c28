//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, LogFormat, VistaConfig};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (or a preset)
/// 2. Configuration file or string (TOML or JSON)
/// 3. Environment variables
///
/// A file or string replaces the whole configuration; fields it omits take
/// their defaults.
///
/// # Example
///
/// ```no_run
/// use vista_config::ConfigLoader;
///
/// # fn main() -> Result<(), vista_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("vista.toml")?
///     .with_env_prefix("VISTA")
///     .load()?;
///
/// println!("Templates are read from {}", config.view.template_dir.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: VistaConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: VistaConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = VistaConfig::default();
        self
    }

    /// Start from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = VistaConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = VistaConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, or does not parse (unknown fields included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        self.config = parse(&content, &extension)?;

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or
    /// `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use vista_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [view]
    ///     template_dir = "views"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.view.template_dir.to_str(), Some("views"));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `VISTA__VIEW__TEMPLATE_DIR=views` or
    /// `VISTA__TELEMETRY__LOGGING__LEVEL=debug`. List values such as
    /// `VISTA__VIEW__INCLUDE_PATHS` are comma separated.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from a `.env` file in the current directory or its
    /// parents, if there is one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if a `.env` file exists but is
    /// malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loaded .env file");
                Ok(self)
            }
            Err(err) if err.not_found() => Ok(self),
            Err(err) => Err(err.into()),
        }
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<VistaConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(k, _)| k.starts_with(&prefix))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> VistaConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // Shares the prefix but not the separator, e.g. VISTAX__...
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let view = &mut self.config.view;
        let telemetry = &mut self.config.telemetry;

        match parts.as_slice() {
            ["VIEW", "TEMPLATE_DIR"] => view.template_dir = PathBuf::from(value),
            ["VIEW", "DEFAULT_TEMPLATE"] => view.default_template = value.to_string(),
            ["VIEW", "INCLUDE_PATHS"] => {
                view.include_paths = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect();
            }
            ["VIEW", "DEFAULT_ENTRY"] => view.default_entry = value.to_string(),
            ["VIEW", "STRICT_UNDEFINED"] => {
                view.strict_undefined = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => telemetry.logging.level = value.to_string(),
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                telemetry.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            ["TELEMETRY", "METRICS", "ENABLED"] => {
                telemetry.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "METRICS", "ADDR"] => telemetry.metrics.addr = value.to_string(),

            _ => tracing::debug!(var = key, "Ignoring unknown configuration variable"),
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<VistaConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, VistaConfig::default());
    }

    #[test]
    fn test_loader_presets() {
        let dev = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(dev.telemetry.logging.format, LogFormat::Pretty);

        let prod = ConfigLoader::new()
            .with_development()
            .with_production()
            .load()
            .unwrap();
        assert_eq!(prod.telemetry.logging.format, LogFormat::Json);
        assert!(!prod.view.strict_undefined);
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            [view]
            template_dir = "views"
            default_template = "home.html"
            include_paths = ["views/partials", "views/layouts"]

            [telemetry.logging]
            format = "pretty"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.view.template_dir, PathBuf::from("views"));
        assert_eq!(config.view.default_template, "home.html");
        assert_eq!(config.view.include_paths.len(), 2);
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"view": {"default_entry": "base.html", "strict_undefined": true}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "JSON")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.view.default_entry, "base.html");
        assert!(config.view.strict_undefined);
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        let err = ConfigLoader::new().with_string("", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(f) if f == "yaml"));
    }

    #[test]
    fn test_loader_unknown_field_fails() {
        let result = ConfigLoader::new().with_string("[view]\ntemplates = \"x\"\n", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vista.toml");
        fs::write(&path, "[view]\ndefault_template = \"index.html\"\n").unwrap();

        let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
        assert_eq!(config.view.default_template, "index.html");
    }

    #[test]
    fn test_loader_with_file_bad_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vista.yaml");
        fs::write(&path, "view: {}").unwrap();

        let err = ConfigLoader::new().with_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let err = ConfigLoader::new()
            .with_file("/nonexistent/vista.toml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/vista.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, VistaConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[view]\ndefault_template = \"/abs.html\"\n", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_unvalidated() {
        let config = ConfigLoader::new()
            .with_string("[view]\ndefault_template = \"/abs.html\"\n", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.view.default_template, "/abs.html");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_apply_env_var_view() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__VIEW__TEMPLATE_DIR", "views", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__VIEW__INCLUDE_PATHS", "views/a, views/b,,", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__VIEW__STRICT_UNDEFINED", "yes", "TEST")
            .unwrap();

        assert_eq!(loader.config.view.template_dir, PathBuf::from("views"));
        assert_eq!(
            loader.config.view.include_paths,
            vec![PathBuf::from("views/a"), PathBuf::from("views/b")]
        );
        assert!(loader.config.view.strict_undefined);
    }

    #[test]
    fn test_apply_env_var_telemetry() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__LEVEL", "debug", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "Pretty", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "true", "TEST")
            .unwrap();

        assert_eq!(loader.config.telemetry.logging.level, "debug");
        assert_eq!(loader.config.telemetry.logging.format, LogFormat::Pretty);
        assert!(loader.config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_apply_env_var_invalid_boolean() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_var("TEST__VIEW__STRICT_UNDEFINED", "sometimes", "TEST")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_apply_env_var_ignores_unknown_and_foreign_keys() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__VIEW__NOPE", "x", "TEST")
            .unwrap();
        loader
            .apply_env_var("TESTING__VIEW__TEMPLATE_DIR", "x", "TEST")
            .unwrap();
        assert_eq!(loader.config, VistaConfig::default());
    }
}
