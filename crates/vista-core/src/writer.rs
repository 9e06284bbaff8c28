//! Response writers.
//!
//! Handlers produce responses by writing to a [`ResponseWriter`]: they adjust
//! headers, write a status line once, then stream body bytes. The
//! [`ResponseRecorder`] is the in-memory implementation used by the pipeline;
//! it turns into an `http::Response` once the request has been handled.

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use std::io;

/// A sink for a single HTTP response.
///
/// # Invariants
///
/// - Headers must be set before the status line is written; later header
///   changes are not sent.
/// - The first [`write_header`](ResponseWriter::write_header) wins.
/// - A body write before any status line implies `200 OK`.
pub trait ResponseWriter: Send {
    /// Returns the header map that will be sent with the status line.
    fn headers(&self) -> &HeaderMap;

    /// Returns the header map for modification.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Writes the status line and the current headers.
    fn write_header(&mut self, status: StatusCode);

    /// Writes body bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Reports whether a response has been sent through this writer.
    ///
    /// Returns `None` for writers that do not track this. See
    /// [`DoneWriter`](crate::DoneWriter).
    fn done(&self) -> Option<bool> {
        None
    }

    /// Writes the whole buffer.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf)? {
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole response body",
                    ))
                }
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }
}

/// In-memory [`ResponseWriter`].
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use vista_core::{ResponseRecorder, ResponseWriter};
///
/// let mut recorder = ResponseRecorder::new();
/// recorder.headers_mut().insert("x-foo", "bar".parse().unwrap());
/// recorder.write_all(b"hello").unwrap();
///
/// let response = recorder.into_response();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.headers()["x-foo"], "bar");
/// ```
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    /// Headers as currently set by handlers.
    headers: HeaderMap,
    /// Status and header snapshot taken when the status line was written.
    sent: Option<(StatusCode, HeaderMap)>,
    /// Body bytes written so far.
    body: BytesMut,
    /// Whether further body writes are refused.
    closed: bool,
}

impl ResponseRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a status line has been written.
    #[must_use]
    pub fn wrote_header(&self) -> bool {
        self.sent.is_some()
    }

    /// Returns the status that was written, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.sent.as_ref().map(|(status, _)| *status)
    }

    /// Returns the status a client would observe: the written status, or
    /// `200` when nothing has been written.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status().unwrap_or(StatusCode::OK).as_u16()
    }

    /// Returns the headers a client would observe.
    ///
    /// This is the snapshot taken at [`write_header`](ResponseWriter::write_header),
    /// or the current headers when no status line was written yet.
    #[must_use]
    pub fn sent_headers(&self) -> &HeaderMap {
        match &self.sent {
            Some((_, headers)) => headers,
            None => &self.headers,
        }
    }

    /// Returns the body written so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Refuses all further body writes.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Returns true if the recorder has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Converts the recorded response into an `http::Response`.
    #[must_use]
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let (status, headers) = self
            .sent
            .unwrap_or((StatusCode::OK, self.headers));

        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseWriter for ResponseRecorder {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some((sent, _)) = &self.sent {
            tracing::warn!(
                http.status_code = status.as_u16(),
                sent = sent.as_u16(),
                "superfluous write_header call"
            );
            return;
        }
        self.sent = Some((status, self.headers.clone()));
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "response writer is closed",
            ));
        }
        if self.sent.is_none() {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}
