//! End-to-end pipeline behavior with the built-in stages.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use vista_core::{handle_error, writer_is_done, StatusError};
use vista_middleware::stages::{RequestIdMiddleware, WrapWriterMiddleware, REQUEST_ID_HEADER};
use vista_middleware::{FnMiddleware, Middleware, Pipeline, Request};

fn request(path: &str) -> Request {
    http::Request::builder()
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Responds with an error only when nothing was written further in.
fn fallback() -> impl Middleware {
    FnMiddleware::new("fallback", |ctx, writer, request, next| {
        Box::pin(async move {
            next.run(ctx, writer, request).await;
            if writer_is_done(writer) == Ok(false) {
                let err = StatusError::new(404, "nothing here");
                let _ = handle_error(writer, Some(&err));
            }
        })
    })
}

#[tokio::test]
async fn untouched_writer_gets_fallback_response() {
    let pipeline = Pipeline::builder()
        .stage(RequestIdMiddleware::new())
        .stage(WrapWriterMiddleware::new())
        .stage(fallback())
        .build();

    let response = pipeline.handle(request("/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Error 404: nothing here");
}

#[tokio::test]
async fn handler_response_is_left_alone() {
    let pipeline = Pipeline::builder()
        .stage(WrapWriterMiddleware::new())
        .stage(fallback())
        .handler(|_ctx, writer, _req| {
            Box::pin(async move {
                writer.write_header(StatusCode::CREATED);
                let _ = writer.write_all(b"made");
            })
        })
        .build();

    let response = pipeline.handle(request("/things")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"made");
}
