//! # Vista View
//!
//! MVC-style views for Vista pipelines.
//!
//! Handlers put values into a per-request [`Stash`] and return without
//! writing. The [`ViewMiddleware`] then renders a template with the stash as
//! its data. Handlers that respond themselves bypass rendering entirely.
//!
//! ```text
//! request ─► ViewMiddleware ─► handler (fills stash)
//!                 │
//!                 └─ handler wrote nothing? render template(stash)
//! ```
//!
//! ## Reserved stash keys
//!
//! | Key | Type | Meaning |
//! |-----|------|---------|
//! | `_req` | map | the request, see [`RequestInfo`] |
//! | `_funcs` | map | function overrides, see [`FuncMap`] |
//! | `_template` | string | template file to render |
//! | `_status` | integer | status code to send |
//! | `_entry` | string | template to execute |
//!
//! Values of the wrong type are ignored.

#![doc(html_root_url = "https://docs.rs/vista-view/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod funcs;
pub mod keys;
mod loader;
pub mod metrics;
mod request;
mod stash;
mod view;

pub use error::{ViewError, ViewResult};
pub use funcs::FuncMap;
pub use request::RequestInfo;
pub use stash::{Stash, StashExt};
pub use view::{ViewBuilder, ViewMiddleware};

// Template values are minijinja values; re-exported so handlers need no
// direct dependency.
pub use minijinja::{context, Value};
