//! # Vista Core
//!
//! Core types shared by every Vista crate.
//!
//! - [`ResponseWriter`] - The response sink handlers write to
//! - [`ResponseRecorder`] - In-memory sink that becomes an `http::Response`
//! - [`DoneWriter`] - Sink wrapper that remembers whether a response was sent
//! - [`StatusError`] - Error value carrying an HTTP status code
//! - [`RequestId`] - UUID v7 request identifier
//!
//! ## Example
//!
//! ```
//! use vista_core::{handle_error, status_code, ResponseRecorder, StatusError};
//!
//! let err = StatusError::new(404, "no such page");
//! assert_eq!(status_code(Some(&err)), 404);
//!
//! let mut recorder = ResponseRecorder::new();
//! handle_error(&mut recorder, Some(&err)).unwrap();
//! assert_eq!(recorder.status_code(), 404);
//! assert_eq!(recorder.body_text(), "Error 404: no such page");
//! ```

#![doc(html_root_url = "https://docs.rs/vista-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod done;
mod error;
mod writer;

pub use context::{RemoteAddr, RequestId};
pub use done::{writer_is_done, DoneWriter, NotTrackedError};
pub use error::{
    handle_error, status_code, BoxError, MessageError, StatusCoder, StatusError,
    DEFAULT_ERROR_STATUS, PLAIN_TEXT_CONTENT_TYPE,
};
pub use writer::{ResponseRecorder, ResponseWriter};
