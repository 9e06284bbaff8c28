//! Done-tracking stage.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::Request;
use vista_core::{DoneWriter, ResponseWriter};

/// Middleware that wraps the response writer in a [`DoneWriter`] for the
/// rest of the chain.
///
/// Stages further in can then call
/// [`writer_is_done`](vista_core::writer_is_done) to find out whether the
/// handler already responded.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapWriterMiddleware;

impl WrapWriterMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for WrapWriterMiddleware {
    fn name(&self) -> &'static str {
        "wrap_writer"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        writer: &'a mut dyn ResponseWriter,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut tracked = DoneWriter::new(writer);
            next.run(ctx, &mut tracked, request).await;
        })
    }
}
