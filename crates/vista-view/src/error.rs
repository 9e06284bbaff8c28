//! View rendering errors.

use std::io;
use thiserror::Error;
use vista_core::{StatusCoder, StatusError, DEFAULT_ERROR_STATUS};

/// Result type for view operations.
pub type ViewResult<T> = Result<T, ViewError>;

/// Errors that can occur while rendering a view.
///
/// Every variant is a server-side failure and maps to status 500.
#[derive(Debug, Error)]
pub enum ViewError {
    /// Neither the stash nor the configuration names a template.
    #[error("no template name provided")]
    NoTemplateName,

    /// The template directory is not configured.
    #[error("template dir not defined")]
    TemplateDirNotDefined,

    /// The template name points outside the template directory.
    #[error("template name escapes template dir: {name}")]
    InvalidTemplateName {
        /// The rejected name.
        name: String,
    },

    /// A template file could not be read.
    #[error("{path}: {source}")]
    Read {
        /// The file that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A template file failed to parse.
    #[error("{path}: {source}")]
    Parse {
        /// The file that failed.
        path: String,
        /// Underlying template error.
        #[source]
        source: minijinja::Error,
    },

    /// An include path could not be loaded.
    #[error("{path}: {source}")]
    Include {
        /// The include directory that failed.
        path: String,
        /// What went wrong inside it.
        #[source]
        source: Box<ViewError>,
    },

    /// An include path contains no files.
    #[error("pattern matches no files: {path}")]
    EmptyInclude {
        /// The include directory.
        path: String,
    },

    /// The stash holds a status override outside `100..=999`.
    #[error("invalid status override: {0}")]
    InvalidStatus(i64),

    /// Template execution failed.
    #[error(transparent)]
    Execute(#[from] minijinja::Error),

    /// The rendered page could not be written.
    #[error("write response: {0}")]
    Write(#[source] io::Error),
}

impl ViewError {
    /// Returns a short label for metrics and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoTemplateName => "no_template_name",
            Self::TemplateDirNotDefined => "template_dir_not_defined",
            Self::InvalidTemplateName { .. } => "invalid_template_name",
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::Include { .. } | Self::EmptyInclude { .. } => "include",
            Self::InvalidStatus(_) => "invalid_status",
            Self::Execute(_) => "execute",
            Self::Write(_) => "write",
        }
    }
}

impl StatusCoder for ViewError {
    fn status_code(&self) -> u16 {
        DEFAULT_ERROR_STATUS
    }
}

impl From<ViewError> for StatusError {
    fn from(err: ViewError) -> Self {
        let status = err.status_code();
        StatusError::wrap(status, err)
    }
}
