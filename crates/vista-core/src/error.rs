//! Status-coded errors.
//!
//! This module provides [`StatusError`], an error that carries the HTTP status
//! code it should be served with, together with the helpers that turn any
//! error into an HTTP error response.
//!
//! # Status resolution
//!
//! [`status_code`] reports:
//!
//! | Input | Status |
//! |-------|--------|
//! | `None` (no error) | `0` |
//! | a [`StatusError`] | its status |
//! | any other error | `500` |
//!
//! Wrapping is explicit: a [`StatusError`] owns its cause and exposes it via
//! [`StatusError::inner`] and [`StatusError::into_inner`]. Only the outermost
//! error is consulted for a status; wrapping a `StatusError` in an unrelated
//! error type hides its status.

use crate::writer::ResponseWriter;
use http::{header, HeaderValue, StatusCode};
use std::error::Error as StdError;
use std::fmt;
use std::io;
use thiserror::Error;

/// Boxed error type used as the cause of a [`StatusError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Status reported for errors that do not declare one.
pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Content type applied to error bodies when the response has none.
pub const PLAIN_TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Capability of errors that know which HTTP status they map to.
///
/// [`status_code`] and [`handle_error`] only recognize [`StatusError`].
/// Other implementors are reported as [`DEFAULT_ERROR_STATUS`] unless they
/// are wrapped first, e.g. `StatusError::wrap(err.status_code(), err)`.
pub trait StatusCoder {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

/// An error bundled with an HTTP status code.
///
/// The error renders exactly like its cause, so wrapping never changes the
/// message a client sees.
///
/// # Example
///
/// ```
/// use vista_core::{status_code, StatusError};
///
/// let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
/// let err = StatusError::wrapf(404, io_err, "loading user 7");
///
/// assert_eq!(err.to_string(), "loading user 7: missing");
/// assert_eq!(status_code(Some(&err)), 404);
/// ```
#[derive(Debug)]
pub struct StatusError {
    status: u16,
    source: BoxError,
}

impl StatusError {
    /// Bundles an existing error with a status code.
    pub fn wrap(status: u16, err: impl Into<BoxError>) -> Self {
        Self {
            status,
            source: err.into(),
        }
    }

    /// Bundles an existing error with a status code and a message layer.
    ///
    /// The resulting error renders as `"<message>: <cause>"`.
    pub fn wrapf(status: u16, err: impl Into<BoxError>, message: impl fmt::Display) -> Self {
        Self::wrap(status, MessageError::new(message.to_string(), err))
    }

    /// Creates a status-coded error from a plain message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::wrap(status, message)
    }

    /// Creates a status-coded error from format arguments.
    ///
    /// Usually invoked through [`status_errorf!`](crate::status_errorf).
    pub fn errorf(status: u16, args: fmt::Arguments<'_>) -> Self {
        Self::new(status, fmt::format(args))
    }

    /// Returns the wrapped cause.
    #[must_use]
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Consumes the error and returns the wrapped cause.
    #[must_use]
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

impl StatusCoder for StatusError {
    fn status_code(&self) -> u16 {
        self.status
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl StdError for StatusError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Builds a [`StatusError`] from a status and format arguments.
///
/// ```
/// use vista_core::{status_code, status_errorf};
///
/// let err = status_errorf!(409, "version {} is stale", 3);
/// assert_eq!(err.to_string(), "version 3 is stale");
/// assert_eq!(status_code(Some(&err)), 409);
/// ```
#[macro_export]
macro_rules! status_errorf {
    ($status:expr, $($arg:tt)+) => {
        $crate::StatusError::errorf($status, format_args!($($arg)+))
    };
}

/// A message layered on top of a cause.
#[derive(Debug, Error)]
#[error("{message}: {source}")]
pub struct MessageError {
    message: String,
    source: BoxError,
}

impl MessageError {
    /// Layers `message` on top of `source`.
    pub fn new(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Returns the message of this layer alone.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Returns the HTTP status embedded in `err`.
///
/// Returns `0` when there is no error and [`DEFAULT_ERROR_STATUS`] for errors
/// that are not a [`StatusError`].
pub fn status_code(err: Option<&(dyn StdError + 'static)>) -> u16 {
    let Some(err) = err else {
        return 0;
    };

    match err.downcast_ref::<StatusError>() {
        Some(coded) => coded.status_code(),
        None => DEFAULT_ERROR_STATUS,
    }
}

/// Serves an error response if `err` is present.
///
/// Writes the error's status followed by the body `Error <status>: <message>`.
/// A status that cannot appear on a status line is served as 500. When the
/// response has no content type yet, [`PLAIN_TEXT_CONTENT_TYPE`] is applied.
///
/// This is a no-op when `err` is `None`. An error is returned when the body
/// cannot be written, for instance because the writer has been closed.
pub fn handle_error(
    writer: &mut dyn ResponseWriter,
    err: Option<&(dyn StdError + 'static)>,
) -> io::Result<()> {
    let Some(err) = err else {
        return Ok(());
    };

    let status = StatusCode::from_u16(status_code(Some(err)))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    tracing::error!(
        http.status_code = status.as_u16(),
        error = %err,
        "Serving error response"
    );

    if !writer.headers().contains_key(header::CONTENT_TYPE) {
        writer.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PLAIN_TEXT_CONTENT_TYPE),
        );
    }

    writer.write_header(status);
    let body = format!("Error {}: {}", status.as_u16(), err);
    writer.write_all(body.as_bytes())
}
