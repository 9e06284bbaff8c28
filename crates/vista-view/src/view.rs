//! The view middleware.
//!
//! [`ViewMiddleware`] gives the rest of the chain a fresh [`Stash`] and a
//! done-tracking writer. When the handler returns without responding, the
//! middleware renders a template with the stash as its data:
//!
//! 1. Template name: stash `_template` (string), else the default template.
//! 2. The template directory must be configured.
//! 3. The page and every include-path file are loaded.
//! 4. Functions: the default table overlaid with stash `_funcs`.
//! 5. Status: stash `_status` (integer) is written before execution.
//! 6. Entry point: stash `_entry` (string), else the default entry, else the
//!    template name.
//!
//! Failures become `Error 500: <message>` responses.

use crate::error::{ViewError, ViewResult};
use crate::funcs::FuncMap;
use crate::keys;
use crate::loader::{load_templates, LoadOptions};
use crate::metrics::{record_render, record_skipped, Outcome};
use crate::request::RequestInfo;
use crate::stash::{Stash, StashExt};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use minijinja::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use vista_config::ViewSettings;
use vista_core::{handle_error, DoneWriter, ResponseWriter, StatusError};
use vista_middleware::{BoxFuture, Middleware, MiddlewareContext, Next, Request};

/// Middleware that renders a template unless the handler already responded.
///
/// # Example
///
/// ```
/// use minijinja::Value;
/// use vista_middleware::Pipeline;
/// use vista_view::{StashExt, ViewMiddleware};
///
/// let view = ViewMiddleware::builder()
///     .template_dir("templates")
///     .default_template("index.html")
///     .func("year", Value::from_function(|| 2024))
///     .build();
///
/// let pipeline = Pipeline::builder()
///     .stage(view)
///     .handler(|ctx, _writer, _req| {
///         Box::pin(async move {
///             if let Some(stash) = ctx.stash_mut() {
///                 stash.insert("Name", "Gregory");
///             }
///         })
///     })
///     .build();
/// # let _ = pipeline;
/// ```
#[derive(Debug, Clone)]
pub struct ViewMiddleware {
    template_dir: PathBuf,
    default_template: String,
    funcs: FuncMap,
    include_paths: Vec<PathBuf>,
    default_entry: String,
    options: LoadOptions,
}

impl ViewMiddleware {
    /// Creates a view rendering `default_template` from `template_dir`.
    pub fn new(template_dir: impl Into<PathBuf>, default_template: impl Into<String>) -> Self {
        Self::builder()
            .template_dir(template_dir)
            .default_template(default_template)
            .build()
    }

    /// Creates a builder with nothing configured.
    #[must_use]
    pub fn builder() -> ViewBuilder {
        ViewBuilder::new()
    }

    /// Creates a view from a configuration section.
    #[must_use]
    pub fn from_settings(settings: &ViewSettings) -> Self {
        ViewBuilder::from_settings(settings).build()
    }

    /// Returns the template directory.
    #[must_use]
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Returns the default function table.
    #[must_use]
    pub fn funcs(&self) -> &FuncMap {
        &self.funcs
    }

    /// Renders the page described by `stash` into `writer`.
    ///
    /// Errors are written as a plain-text error response. If a status
    /// override was already sent when a later step fails, the error body is
    /// written under that status.
    pub fn render(&self, writer: &mut dyn ResponseWriter, stash: &Stash) {
        let started = Instant::now();
        match self.try_render(writer, stash) {
            Ok(()) => record_render(Outcome::Rendered, started.elapsed()),
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "View render failed");
                record_render(Outcome::Error, started.elapsed());

                let err = StatusError::from(err);
                if let Err(write_err) = handle_error(writer, Some(&err)) {
                    tracing::warn!(error = %write_err, "Failed to write error response");
                }
            }
        }
    }

    fn try_render(&self, writer: &mut dyn ResponseWriter, stash: &Stash) -> ViewResult<()> {
        let name = self.template_name(stash)?;
        if self.template_dir.as_os_str().is_empty() {
            return Err(ViewError::TemplateDirNotDefined);
        }

        let funcs = self.merged_funcs(stash);
        let env = load_templates(
            &self.template_dir,
            name,
            &self.include_paths,
            &funcs,
            self.options,
        )?;

        if let Some(status) = status_override(stash)? {
            set_default_content_type(writer);
            writer.write_header(status);
        }

        let entry = self.entry_point(stash, name);
        let mut data: HashMap<&str, &Value> = stash.iter().map(|(k, v)| (k.as_str(), v)).collect();
        let template_value = Value::from(name);
        data.insert(keys::TEMPLATE, &template_value);

        let body = env.get_template(entry)?.render(&data)?;

        set_default_content_type(writer);
        writer.write_all(body.as_bytes()).map_err(ViewError::Write)?;

        tracing::debug!(template = name, entry, bytes = body.len(), "Rendered view");
        Ok(())
    }

    /// Resolves the template file to render.
    ///
    /// A non-string `_template` value is ignored.
    pub fn template_name<'s>(&'s self, stash: &'s Stash) -> ViewResult<&'s str> {
        if let Some(name) = stash.get_str(keys::TEMPLATE) {
            return Ok(name);
        }
        if self.default_template.is_empty() {
            return Err(ViewError::NoTemplateName);
        }
        Ok(&self.default_template)
    }

    fn entry_point<'s>(&'s self, stash: &'s Stash, name: &'s str) -> &'s str {
        if let Some(entry) = stash.get_str(keys::ENTRY) {
            return entry;
        }
        if self.default_entry.is_empty() {
            name
        } else {
            &self.default_entry
        }
    }

    /// Returns the default function table overlaid with the stash's
    /// `_funcs` value, if it holds one.
    pub fn merged_funcs<'s>(&'s self, stash: &Stash) -> Cow<'s, FuncMap> {
        match stash.get(keys::FUNCS).and_then(FuncMap::from_value) {
            Some(overrides) => {
                let mut funcs = self.funcs.clone();
                funcs.overlay(&overrides);
                Cow::Owned(funcs)
            }
            None => Cow::Borrowed(&self.funcs),
        }
    }
}

impl Middleware for ViewMiddleware {
    fn name(&self) -> &'static str {
        "view"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        writer: &'a mut dyn ResponseWriter,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut stash = Stash::new();
            stash.insert(keys::REQUEST, RequestInfo::from_request(&request).to_value());
            ctx.attach_stash(stash);

            let mut tracked = DoneWriter::new(writer);
            next.run(ctx, &mut tracked, request).await;

            if tracked.is_done() {
                tracing::debug!("Response already written, skipping view");
                record_skipped();
                return;
            }

            let empty = Stash::new();
            let stash = ctx.stash().unwrap_or(&empty);
            self.render(&mut tracked, stash);
        })
    }
}

/// Reads the `_status` override.
///
/// Non-integer values are ignored; integers outside `100..=999` are an error.
fn status_override(stash: &Stash) -> ViewResult<Option<StatusCode>> {
    let Some(value) = stash.get(keys::STATUS) else {
        return Ok(None);
    };
    if !value.is_integer() {
        return Ok(None);
    }
    let Some(code) = value.as_i64() else {
        return Ok(None);
    };

    u16::try_from(code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .map(Some)
        .ok_or(ViewError::InvalidStatus(code))
}

fn set_default_content_type(writer: &mut dyn ResponseWriter) {
    if !writer.headers().contains_key(CONTENT_TYPE) {
        writer
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(keys::DEFAULT_CONTENT_TYPE));
    }
}

/// Builder for [`ViewMiddleware`].
#[derive(Debug, Clone, Default)]
pub struct ViewBuilder {
    template_dir: PathBuf,
    default_template: String,
    funcs: FuncMap,
    include_paths: Vec<PathBuf>,
    default_entry: String,
    strict_undefined: bool,
}

impl ViewBuilder {
    /// Creates a builder with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a configuration section.
    #[must_use]
    pub fn from_settings(settings: &ViewSettings) -> Self {
        Self {
            template_dir: settings.template_dir.clone(),
            default_template: settings.default_template.clone(),
            funcs: FuncMap::new(),
            include_paths: settings.include_paths.clone(),
            default_entry: settings.default_entry.clone(),
            strict_undefined: settings.strict_undefined,
        }
    }

    /// Sets the directory template names are resolved against.
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = dir.into();
        self
    }

    /// Sets the template rendered when the stash names none.
    pub fn default_template(mut self, name: impl Into<String>) -> Self {
        self.default_template = name.into();
        self
    }

    /// Adds a function to the default table.
    pub fn func(mut self, name: impl Into<String>, func: impl Into<Value>) -> Self {
        self.funcs.insert(name, func);
        self
    }

    /// Replaces the default function table.
    pub fn funcs(mut self, funcs: FuncMap) -> Self {
        self.funcs = funcs;
        self
    }

    /// Adds a directory whose files are loaded into every render.
    pub fn include_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_paths.push(dir.into());
        self
    }

    /// Sets the template executed when the stash names no entry point.
    pub fn default_entry(mut self, name: impl Into<String>) -> Self {
        self.default_entry = name.into();
        self
    }

    /// Makes any use of an undefined value a render error.
    pub fn strict_undefined(mut self, strict: bool) -> Self {
        self.strict_undefined = strict;
        self
    }

    /// Builds the middleware.
    #[must_use]
    pub fn build(self) -> ViewMiddleware {
        ViewMiddleware {
            template_dir: self.template_dir,
            default_template: self.default_template,
            funcs: self.funcs,
            include_paths: self.include_paths,
            default_entry: self.default_entry,
            options: LoadOptions {
                strict_undefined: self.strict_undefined,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_core::ResponseRecorder;

    fn constant(s: &'static str) -> Value {
        Value::from_function(move || s.to_string())
    }

    #[test]
    fn test_template_name_from_stash() {
        let view = ViewMiddleware::new("t", "foo");
        let stash: Stash = [(keys::TEMPLATE, "bar")].into_iter().collect();
        assert_eq!(view.template_name(&stash).unwrap(), "bar");
    }

    #[test]
    fn test_template_name_default() {
        let view = ViewMiddleware::new("t", "foo");
        assert_eq!(view.template_name(&Stash::new()).unwrap(), "foo");
    }

    #[test]
    fn test_template_name_wrong_type_falls_back() {
        let view = ViewMiddleware::new("t", "foo");
        let stash: Stash = [(keys::TEMPLATE, 123)].into_iter().collect();
        assert_eq!(view.template_name(&stash).unwrap(), "foo");
    }

    #[test]
    fn test_template_name_missing() {
        let view = ViewMiddleware::new("t", "");
        assert!(matches!(
            view.template_name(&Stash::new()),
            Err(ViewError::NoTemplateName)
        ));
    }

    #[test]
    fn test_entry_point_order() {
        let plain = ViewMiddleware::new("t", "page");
        let with_default = ViewMiddleware::builder().default_entry("layout").build();
        let stash: Stash = [(keys::ENTRY, "override")].into_iter().collect();
        let wrong: Stash = [(keys::ENTRY, 5)].into_iter().collect();

        assert_eq!(plain.entry_point(&Stash::new(), "page"), "page");
        assert_eq!(with_default.entry_point(&Stash::new(), "page"), "layout");
        assert_eq!(with_default.entry_point(&stash, "page"), "override");
        assert_eq!(with_default.entry_point(&wrong, "page"), "layout");
    }

    #[test]
    fn test_merged_funcs_borrows_without_override() {
        let view = ViewMiddleware::builder().func("a", constant("a")).build();
        assert!(matches!(view.merged_funcs(&Stash::new()), Cow::Borrowed(_)));
    }

    #[test]
    fn test_merged_funcs_does_not_touch_defaults() {
        let view = ViewMiddleware::builder().func("a", constant("a")).build();
        let overrides: FuncMap = [("b", constant("b"))].into_iter().collect();
        let stash: Stash = [(keys::FUNCS, Value::from(overrides))].into_iter().collect();

        let merged = view.merged_funcs(&stash);
        assert!(merged.contains("a"));
        assert!(merged.contains("b"));
        assert!(!view.funcs().contains("b"));
    }

    #[test]
    fn test_merged_funcs_ignores_wrong_type() {
        let view = ViewMiddleware::builder().func("a", constant("a")).build();
        let stash: Stash = [(keys::FUNCS, "not a map")].into_iter().collect();
        assert_eq!(view.merged_funcs(&stash).len(), 1);
    }

    #[test]
    fn test_status_override() {
        let ok: Stash = [(keys::STATUS, 600)].into_iter().collect();
        let text: Stash = [(keys::STATUS, "404")].into_iter().collect();
        let flag: Stash = [(keys::STATUS, true)].into_iter().collect();
        let float: Stash = [(keys::STATUS, 404.0_f64)].into_iter().collect();
        let huge: Stash = [(keys::STATUS, 1000)].into_iter().collect();
        let negative: Stash = [(keys::STATUS, -1)].into_iter().collect();

        assert_eq!(
            status_override(&ok).unwrap().map(|s| s.as_u16()),
            Some(600)
        );
        assert!(status_override(&Stash::new()).unwrap().is_none());
        assert!(status_override(&text).unwrap().is_none());
        assert!(status_override(&flag).unwrap().is_none());
        assert!(status_override(&float).unwrap().is_none());
        assert!(matches!(
            status_override(&huge),
            Err(ViewError::InvalidStatus(1000))
        ));
        assert!(matches!(
            status_override(&negative),
            Err(ViewError::InvalidStatus(-1))
        ));
    }

    #[test]
    fn test_render_without_dir() {
        let view = ViewMiddleware::new("", "page");
        let mut recorder = ResponseRecorder::new();
        view.render(&mut recorder, &Stash::new());
        assert_eq!(recorder.status_code(), 500);
        assert_eq!(recorder.body_text(), "Error 500: template dir not defined");
    }

    #[test]
    fn test_render_no_name_checked_first() {
        let view = ViewMiddleware::new("", "");
        let mut recorder = ResponseRecorder::new();
        view.render(&mut recorder, &Stash::new());
        assert_eq!(recorder.body_text(), "Error 500: no template name provided");
    }

    #[test]
    fn test_default_content_type_only_when_unset() {
        let mut recorder = ResponseRecorder::new();
        set_default_content_type(&mut recorder);
        assert_eq!(recorder.headers()[CONTENT_TYPE], keys::DEFAULT_CONTENT_TYPE);

        let mut custom = ResponseRecorder::new();
        custom
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        set_default_content_type(&mut custom);
        assert_eq!(custom.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_builder_from_settings() {
        let settings = ViewSettings {
            template_dir: PathBuf::from("views"),
            default_template: "index.html".to_string(),
            include_paths: vec![PathBuf::from("views/partials")],
            default_entry: "base.html".to_string(),
            strict_undefined: true,
        };
        let view = ViewMiddleware::from_settings(&settings);
        assert_eq!(view.template_dir(), Path::new("views"));
        assert_eq!(view.template_name(&Stash::new()).unwrap(), "index.html");
        assert_eq!(view.entry_point(&Stash::new(), "index.html"), "base.html");
        assert!(view.options.strict_undefined);
    }
}
