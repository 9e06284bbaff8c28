//! Request ID middleware.
//!
//! Assigns every request a [`RequestId`] (UUID v7), stores it in the
//! [`MiddlewareContext`] and echoes it in the `X-Request-ID` response header.
//! The rest of the chain runs inside a `request` tracing span carrying the ID,
//! method and path, so log lines emitted further in can be correlated.
//!
//! An incoming `X-Request-ID` header is only honored when the stage was built
//! with [`RequestIdMiddleware::trust_incoming`].

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::Request;
use http::HeaderValue;
use tracing::Instrument;
use vista_core::{RequestId, ResponseWriter};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or extracts request IDs.
///
/// # Example
///
/// ```
/// use vista_middleware::stages::RequestIdMiddleware;
/// use vista_middleware::Middleware;
///
/// let stage = RequestIdMiddleware::trust_incoming();
/// assert_eq!(stage.name(), "request_id");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to trust incoming request ID headers.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a stage that always generates a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stage that reuses a valid incoming `X-Request-ID`.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        writer: &'a mut dyn ResponseWriter,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);

            // Headers are snapshotted with the status line, so set it first.
            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                writer.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            let span = tracing::info_span!(
                "request",
                request_id = %request_id,
                http.method = %request.method(),
                http.path = %request.uri().path(),
            );

            next.run(ctx, writer, request).instrument(span).await;
        })
    }
}
