//! Built-in middleware stages.
//!
//! - [`request_id`] assigns each request an ID and opens its tracing span.
//! - [`done_writer`] wraps the writer in a [`DoneWriter`](vista_core::DoneWriter)
//!   so inner stages can tell whether a response was already sent.

pub mod done_writer;
pub mod request_id;

pub use done_writer::WrapWriterMiddleware;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
