//! Ordered middleware pipeline.
//!
//! Stages run in the order they were added; the first stage added is the
//! outermost and sees the writer last once the chain unwinds. The pipeline
//! is immutable once built and can be shared across requests.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Handler, Middleware, Next, NoopHandler};
use crate::types::{Request, Response};
use std::sync::Arc;
use vista_core::{ResponseRecorder, ResponseWriter};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered chain of middleware stages ending in a handler.
///
/// # Example
///
/// ```
/// use vista_middleware::Pipeline;
/// use vista_middleware::stages::{RequestIdMiddleware, WrapWriterMiddleware};
///
/// let pipeline = Pipeline::builder()
///     .stage(RequestIdMiddleware::new())
///     .stage(WrapWriterMiddleware::new())
///     .handler(|_ctx, _writer, _req| Box::pin(async {}))
///     .build();
///
/// assert_eq!(pipeline.stage_names(), vec!["request_id", "wrap_writer"]);
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
    handler: Arc<dyn Handler>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `request` through every stage and the handler, writing the
    /// response to `writer`.
    pub async fn process(
        &self,
        ctx: &mut MiddlewareContext,
        writer: &mut dyn ResponseWriter,
        request: Request,
    ) {
        let next = self.build_chain();
        next.run(ctx, writer, request).await;
    }

    /// Runs `request` with a fresh context and returns the recorded response.
    ///
    /// A pipeline that writes nothing produces an empty `200 OK`.
    pub async fn handle(&self, request: Request) -> Response {
        let mut ctx = MiddlewareContext::new();
        let mut recorder = ResponseRecorder::new();
        self.process(&mut ctx, &mut recorder, request).await;
        recorder.into_response()
    }

    /// Builds the middleware chain for a request.
    fn build_chain(&self) -> Next<'_> {
        let mut next = Next::handler(self.handler.as_ref());
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
    handler: Option<Arc<dyn Handler>>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder with no stages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware stage.
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared middleware stage.
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Sets the terminal handler from a closure.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: for<'a> Fn(
                &'a mut MiddlewareContext,
                &'a mut dyn ResponseWriter,
                Request,
            ) -> BoxFuture<'a, ()>
            + Send
            + Sync
            + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Sets the terminal handler from a [`Handler`] implementation.
    pub fn with_handler<H: Handler>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Builds the pipeline.
    ///
    /// Without a handler, the chain ends in [`NoopHandler`].
    #[must_use]
    pub fn build(self) -> Pipeline {
        let handler: Arc<dyn Handler> = match self.handler {
            Some(handler) => handler,
            None => Arc::new(NoopHandler),
        };
        Pipeline {
            stages: self.stages,
            handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderValue, StatusCode};
    use http_body_util::{BodyExt, Full};

    fn test_request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    struct Tag(&'static str);

    impl Middleware for Tag {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            writer: &'a mut dyn ResponseWriter,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                writer
                    .headers_mut()
                    .append("x-stage", HeaderValue::from_static(self.0));
                next.run(ctx, writer, request).await;
            })
        }
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = Pipeline::builder().build();
        assert_eq!(pipeline.stage_count(), 0);
        assert!(pipeline.stage_names().is_empty());
    }

    #[tokio::test]
    async fn test_noop_pipeline_yields_empty_ok() {
        let pipeline = Pipeline::builder().build();
        let response = pipeline.handle(test_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_stages_run_in_order() {
        let pipeline = Pipeline::builder()
            .stage(Tag("first"))
            .stage(Tag("second"))
            .handler(|_ctx, writer, _req| {
                Box::pin(async move {
                    let _ = writer.write_all(b"done");
                })
            })
            .build();

        assert_eq!(pipeline.stage_names(), vec!["first", "second"]);

        let response = pipeline.handle(test_request()).await;
        let stages: Vec<_> = response
            .headers()
            .get_all("x-stage")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(stages, vec!["first", "second"]);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"done");
    }

    #[tokio::test]
    async fn test_process_with_caller_context() {
        struct Seen(bool);

        let pipeline = Pipeline::builder()
            .handler(|ctx, _writer, _req| {
                Box::pin(async move {
                    ctx.set_extension(Seen(true));
                })
            })
            .build();

        let mut ctx = MiddlewareContext::new();
        let mut recorder = ResponseRecorder::new();
        pipeline.process(&mut ctx, &mut recorder, test_request()).await;

        assert!(ctx.get_extension::<Seen>().unwrap().0);
        assert!(!recorder.wrote_header());
    }
}
