//! In-memory test client.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use std::net::SocketAddr;
use std::sync::Arc;
use vista_middleware::Pipeline;

/// Drives a [`Pipeline`] without a network.
///
/// # Example
///
/// ```
/// use vista_middleware::Pipeline;
/// use vista_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder()
///     .handler(|_ctx, writer, _req| {
///         Box::pin(async move {
///             let _ = writer.write_all(b"pong");
///         })
///     })
///     .build();
///
/// let client = TestClient::new(pipeline);
/// let response = client.get("/ping").send().await.unwrap();
/// response.assert_status(200).assert_body("pong");
/// # });
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct TestClient {
    pipeline: Arc<Pipeline>,
    default_headers: Vec<(String, String)>,
    remote_addr: Option<SocketAddr>,
}

impl TestClient {
    /// Creates a client for `pipeline`.
    pub fn new(pipeline: Pipeline) -> Self {
        Self::from_shared(Arc::new(pipeline))
    }

    /// Creates a client for a pipeline that is also used elsewhere.
    pub fn from_shared(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            default_headers: Vec::new(),
            remote_addr: None,
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sets the peer address every request appears to come from.
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Creates a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        if let Some(addr) = self.remote_addr {
            builder = builder.remote_addr(addr);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }

    /// Runs a built request through the pipeline.
    pub async fn execute(&self, request: TestRequest) -> TestResponse {
        let response = self.pipeline.handle(request.into_http_request()).await;
        TestResponse::from_response(response).await
    }
}

/// A request builder bound to a [`TestClient`].
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the peer address for this request.
    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.builder = self.builder.remote_addr(addr);
        self
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns `TestError` if the request could not be built.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        Ok(self.client.execute(request).await)
    }
}
