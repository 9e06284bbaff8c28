//! Reserved stash keys.
//!
//! These keys form the contract between handlers and the view renderer. A
//! value of the wrong type under any of them is ignored.

/// The request being served, as a [`RequestInfo`](crate::RequestInfo) map.
///
/// Injected by the renderer before the handler runs.
pub const REQUEST: &str = "_req";

/// A function table that overrides or augments the default one.
///
/// Accepts a [`FuncMap`](crate::FuncMap) or any string-keyed map value.
pub const FUNCS: &str = "_funcs";

/// Name of the template file to render, relative to the template directory.
pub const TEMPLATE: &str = "_template";

/// Integer status code to send with the rendered page.
pub const STATUS: &str = "_status";

/// Name of the template to execute, when it differs from the template file.
pub const ENTRY: &str = "_entry";

/// Content type applied to rendered pages that have none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";
