//! # Vista
//!
//! **MVC-style middleware for HTTP handlers**
//!
//! - **Done tracking**: know whether a handler already responded
//! - **Status errors**: errors that carry their HTTP status
//! - **Stash**: a per-request map handlers fill and templates read
//! - **Views**: render a template from the stash when the handler wrote
//!   nothing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vista::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("vista.toml")?
//!         .with_env_prefix("VISTA")
//!         .load()?;
//!     vista::telemetry::init_telemetry(&config.telemetry_config())?;
//!
//!     let pipeline = Pipeline::builder()
//!         .stage(RequestIdMiddleware::new())
//!         .stage(ViewMiddleware::from_settings(&config.view))
//!         .handler(|ctx, _writer, _req| {
//!             Box::pin(async move {
//!                 if let Some(stash) = ctx.stash_mut() {
//!                     stash.insert("Name", "world");
//!                 }
//!             })
//!         })
//!         .build();
//!
//!     // Hand `pipeline.process(...)` to your server's request loop.
//!     Ok(())
//! }
//! ```
//!
//! ## Flow
//!
//! ```text
//! Request → RequestId → View ─┬─► Handler (fills stash)
//!                             │
//! Response ◄──────────────────┴── render template unless handler wrote
//! ```

#![doc(html_root_url = "https://docs.rs/vista/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use vista_core as core;

pub use vista_middleware as middleware;

pub use vista_view as view;

pub use vista_config as config;

pub use vista_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```
/// use vista::prelude::*;
///
/// let err = StatusError::new(404, "missing");
/// assert_eq!(status_code(Some(&err)), 404);
/// ```
pub mod prelude {
    pub use vista_core::{
        handle_error, status_code, writer_is_done, DoneWriter, RemoteAddr, RequestId,
        ResponseRecorder, ResponseWriter, StatusCoder, StatusError,
    };

    pub use vista_middleware::stages::{RequestIdMiddleware, WrapWriterMiddleware};
    pub use vista_middleware::{
        BoxFuture, Middleware, MiddlewareContext, Next, Pipeline, Request, Response,
    };

    pub use vista_view::{keys, FuncMap, Stash, StashExt, Value, ViewMiddleware};

    pub use vista_config::{ConfigLoader, VistaConfig};
}
