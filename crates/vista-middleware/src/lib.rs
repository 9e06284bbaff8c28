//! # Vista Middleware
//!
//! Writer-based middleware pipeline for Vista.
//!
//! Every stage receives the per-request [`MiddlewareContext`], the response
//! writer and the request, plus a [`Next`] handle to the rest of the chain.
//! The terminal [`Handler`] either writes a response itself or leaves the
//! writer untouched so an outer stage (such as the view renderer) can
//! produce one.
//!
//! ```text
//! Request → Stage 1 → Stage 2 → … → Handler
//!              │         │
//!              └─────────┴── each stage may act on the writer after `next`
//! ```
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use http::StatusCode;
//! use http_body_util::Full;
//! use vista_middleware::{Pipeline, Request};
//! use vista_middleware::stages::WrapWriterMiddleware;
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::builder()
//!     .stage(WrapWriterMiddleware::new())
//!     .handler(|_ctx, writer, _req| {
//!         Box::pin(async move {
//!             writer.write_header(StatusCode::ACCEPTED);
//!         })
//!     })
//!     .build();
//!
//! let request: Request = http::Request::new(Full::new(Bytes::new()));
//! let response = pipeline.handle(request).await;
//! assert_eq!(response.status(), StatusCode::ACCEPTED);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/vista-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, FnMiddleware, Handler, Middleware, Next, NoopHandler};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use types::{Request, Response};
