//! Done tracking for response writers.
//!
//! A [`DoneWriter`] wraps another [`ResponseWriter`] and remembers whether a
//! status line or body bytes went through it. Later stages use
//! [`writer_is_done`] to decide whether they still own the response.
//!
//! ```
//! use http::StatusCode;
//! use vista_core::{writer_is_done, DoneWriter, ResponseRecorder, ResponseWriter};
//!
//! let mut recorder = ResponseRecorder::new();
//! assert!(writer_is_done(&recorder).is_err());
//!
//! let mut writer = DoneWriter::new(&mut recorder);
//! assert_eq!(writer_is_done(&writer), Ok(false));
//!
//! writer.write_header(StatusCode::NO_CONTENT);
//! assert_eq!(writer_is_done(&writer), Ok(true));
//! ```

use crate::writer::ResponseWriter;
use http::{HeaderMap, StatusCode};
use std::fmt;
use std::io;
use thiserror::Error;

/// Returned when done state is queried on a writer that does not track it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not a DoneWriter")]
pub struct NotTrackedError;

/// A [`ResponseWriter`] that tracks whether a response has been sent.
///
/// Every call is forwarded unchanged to the wrapped writer. The flag is not
/// synchronized; one instance belongs to one request.
pub struct DoneWriter<'w> {
    inner: &'w mut dyn ResponseWriter,
    done: bool,
}

impl<'w> DoneWriter<'w> {
    /// Wraps `inner`.
    pub fn new(inner: &'w mut dyn ResponseWriter) -> Self {
        Self { inner, done: false }
    }

    /// Returns true once a status line or body bytes were written.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl fmt::Debug for DoneWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoneWriter")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl ResponseWriter for DoneWriter<'_> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.done = true;
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.done = true;
        self.inner.write(buf)
    }

    fn done(&self) -> Option<bool> {
        Some(self.done)
    }
}

/// Reports whether a response has been written through `writer`.
///
/// Fails with [`NotTrackedError`] when `writer` does not track done state,
/// so callers never mistake an untracked writer for an unused one.
pub fn writer_is_done(writer: &dyn ResponseWriter) -> Result<bool, NotTrackedError> {
    writer.done().ok_or(NotTrackedError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ResponseRecorder;
    use http::HeaderValue;

    #[test]
    fn test_starts_not_done() {
        let mut recorder = ResponseRecorder::new();
        let writer = DoneWriter::new(&mut recorder);
        assert!(!writer.is_done());
        assert_eq!(writer.done(), Some(false));
    }

    #[test]
    fn test_header_mutation_is_not_done() {
        let mut recorder = ResponseRecorder::new();
        let mut writer = DoneWriter::new(&mut recorder);
        writer
            .headers_mut()
            .insert("x-foo", HeaderValue::from_static("bar"));
        assert!(!writer.is_done());
        assert!(recorder.headers().contains_key("x-foo"));
    }

    #[test]
    fn test_write_header_marks_done_and_forwards() {
        let mut recorder = ResponseRecorder::new();
        let mut writer = DoneWriter::new(&mut recorder);
        writer.write_header(StatusCode::MULTIPLE_CHOICES);
        assert!(writer.is_done());
        assert_eq!(recorder.status(), Some(StatusCode::MULTIPLE_CHOICES));
    }

    #[test]
    fn test_write_marks_done_and_forwards() {
        let mut recorder = ResponseRecorder::new();
        let mut writer = DoneWriter::new(&mut recorder);
        assert_eq!(writer.write(b"abc").unwrap(), 3);
        assert!(writer.is_done());
        assert_eq!(recorder.body(), b"abc");
    }

    #[test]
    fn test_failed_write_still_marks_done() {
        let mut recorder = ResponseRecorder::new();
        recorder.close();
        let mut writer = DoneWriter::new(&mut recorder);
        assert!(writer.write(b"abc").is_err());
        assert!(writer.is_done());
    }

    #[test]
    fn test_writer_is_done_untracked() {
        let recorder = ResponseRecorder::new();
        assert_eq!(writer_is_done(&recorder), Err(NotTrackedError));
        assert_eq!(NotTrackedError.to_string(), "not a DoneWriter");
    }

    #[test]
    fn test_nested_done_writers() {
        let mut recorder = ResponseRecorder::new();
        let mut outer = DoneWriter::new(&mut recorder);
        {
            let mut inner = DoneWriter::new(&mut outer);
            inner.write_all(b"x").unwrap();
            assert_eq!(writer_is_done(&inner), Ok(true));
        }
        assert_eq!(writer_is_done(&outer), Ok(true));
    }
}
