//! Request details exposed to templates.

use minijinja::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use vista_core::RemoteAddr;

/// A template-friendly snapshot of the request.
///
/// Stored in the stash under [`keys::REQUEST`](crate::keys::REQUEST), so a
/// template can write `{{ _req.method }} {{ _req.path }}`.
///
/// Header names are lowercase; repeated headers are joined with `", "`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    /// Request method, e.g. `GET`.
    pub method: String,
    /// Full request target as received.
    pub uri: String,
    /// Path component of the target.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: Option<String>,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Peer address, when the transport recorded a [`RemoteAddr`].
    pub remote_addr: Option<String>,
}

impl RequestInfo {
    /// Captures the details of `request`.
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in request.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|joined| {
                    joined.push_str(", ");
                    joined.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }

        Self {
            method: request.method().to_string(),
            uri: request.uri().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            headers,
            remote_addr: request
                .extensions()
                .get::<RemoteAddr>()
                .map(ToString::to_string),
        }
    }

    /// Converts the snapshot into a template value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::from_serialize(self)
    }
}
