//! Core middleware and handler traits.
//!
//! A [`Middleware`] wraps the rest of the chain: it receives the context, the
//! response writer and the request, and decides when (and whether) to call
//! [`Next::run`]. A [`Handler`] terminates the chain.
//!
//! # Example
//!
//! ```
//! use vista_core::ResponseWriter;
//! use vista_middleware::{BoxFuture, Middleware, MiddlewareContext, Next, Request};
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn name(&self) -> &'static str {
//!         "powered_by"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         writer: &'a mut dyn ResponseWriter,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, ()> {
//!         Box::pin(async move {
//!             writer
//!                 .headers_mut()
//!                 .insert("x-powered-by", http::HeaderValue::from_static("vista"));
//!             next.run(ctx, writer, request).await;
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::types::Request;
use std::future::Future;
use std::pin::Pin;
use vista_core::ResponseWriter;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A pipeline stage.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once; not calling it short-circuits
///   the chain and the stage owns the response.
/// - Headers must be set on the writer before anything writes the status
///   line, so stages that add headers do so before calling `next`.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this stage, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request through this stage.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        writer: &'a mut dyn ResponseWriter,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, ()>;
}

/// The terminal handler of a pipeline.
///
/// A handler may write a complete response, or only enrich the context and
/// return without writing so that an enclosing stage can respond.
pub trait Handler: Send + Sync + 'static {
    /// Handles the request.
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        writer: &'a mut dyn ResponseWriter,
        request: Request,
    ) -> BoxFuture<'a, ()>;
}

impl<F> Handler for F
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
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        writer: &'a mut dyn ResponseWriter,
        request: Request,
    ) -> BoxFuture<'a, ()> {
        (self)(ctx, writer, request)
    }
}

/// A handler that writes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl Handler for NoopHandler {
    fn call<'a>(
        &'a self,
        _ctx: &'a mut MiddlewareContext,
        _writer: &'a mut dyn ResponseWriter,
        _request: Request,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async {})
    }
}

/// Handle to the remainder of the chain.
///
/// Consumed by [`run`](Next::run), so it can only be invoked once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain
    Handler(&'a dyn Handler),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that runs `middleware` before `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes `handler`.
    pub fn handler(handler: &'a dyn Handler) -> Self {
        Self {
            inner: NextInner::Handler(handler),
        }
    }

    /// Invokes the next middleware or the handler.
    pub async fn run(
        self,
        ctx: &mut MiddlewareContext,
        writer: &mut dyn ResponseWriter,
        request: Request,
    ) {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                tracing::trace!(stage = middleware.name(), "Entering middleware stage");
                middleware.process(ctx, writer, request, *next).await;
            }
            NextInner::Handler(handler) => handler.call(ctx, writer, request).await,
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use vista_middleware::FnMiddleware;
///
/// let stage = FnMiddleware::new("passthrough", |ctx, writer, request, next| {
///     Box::pin(async move { next.run(ctx, writer, request).await })
/// });
/// # let _ = stage;
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(
            &'a mut MiddlewareContext,
            &'a mut dyn ResponseWriter,
            Request,
            Next<'a>,
        ) -> BoxFuture<'a, ()>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new closure-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(
            &'a mut MiddlewareContext,
            &'a mut dyn ResponseWriter,
            Request,
            Next<'a>,
        ) -> BoxFuture<'a, ()>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        writer: &'a mut dyn ResponseWriter,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, ()> {
        (self.func)(ctx, writer, request, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use vista_core::ResponseRecorder;

    struct TestMiddleware {
        name: &'static str,
    }

    #[derive(Debug, Default)]
    struct Visited(Vec<&'static str>);

    impl Middleware for TestMiddleware {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            writer: &'a mut dyn ResponseWriter,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                match ctx.get_extension_mut::<Visited>() {
                    Some(visited) => visited.0.push(self.name),
                    None => ctx.set_extension(Visited(vec![self.name])),
                }
                next.run(ctx, writer, request).await;
            })
        }
    }

    fn ok_handler<'a>(
        _ctx: &'a mut MiddlewareContext,
        writer: &'a mut dyn ResponseWriter,
        _request: Request,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            writer.write_header(StatusCode::OK);
            let _ = writer.write_all(b"OK");
        })
    }

    fn test_request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_middleware_name() {
        let mw = TestMiddleware { name: "test" };
        assert_eq!(mw.name(), "test");
    }

    #[tokio::test]
    async fn test_next_handler() {
        let mut ctx = MiddlewareContext::new();
        let mut recorder = ResponseRecorder::new();

        let next = Next::handler(&ok_handler);
        next.run(&mut ctx, &mut recorder, test_request()).await;

        assert_eq!(recorder.status(), Some(StatusCode::OK));
        assert_eq!(recorder.body(), b"OK");
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let mw1 = TestMiddleware { name: "first" };
        let mw2 = TestMiddleware { name: "second" };

        let mut ctx = MiddlewareContext::new();
        let mut recorder = ResponseRecorder::new();

        let next2 = Next::new(&mw2, Next::handler(&ok_handler));
        let next1 = Next::new(&mw1, next2);
        next1.run(&mut ctx, &mut recorder, test_request()).await;

        assert_eq!(recorder.status(), Some(StatusCode::OK));
        assert_eq!(
            ctx.get_extension::<Visited>().unwrap().0,
            vec!["first", "second"]
        );
    }

    #[tokio::test]
    async fn test_noop_handler_writes_nothing() {
        let mut ctx = MiddlewareContext::new();
        let mut recorder = ResponseRecorder::new();

        Next::handler(&NoopHandler)
            .run(&mut ctx, &mut recorder, test_request())
            .await;

        assert!(!recorder.wrote_header());
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuits() {
        let stage = FnMiddleware::new("deny", |_ctx, writer, _request, _next| {
            Box::pin(async move {
                writer.write_header(StatusCode::FORBIDDEN);
            })
        });

        let mut ctx = MiddlewareContext::new();
        let mut recorder = ResponseRecorder::new();
        Next::new(&stage, Next::handler(&ok_handler))
            .run(&mut ctx, &mut recorder, test_request())
            .await;

        assert_eq!(stage.name(), "deny");
        assert_eq!(recorder.status(), Some(StatusCode::FORBIDDEN));
        assert!(recorder.body().is_empty());
    }
}
