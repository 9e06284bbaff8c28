//! # Vista Test
//!
//! In-memory testing for Vista pipelines: requests go through every stage
//! and the handler, and the response is collected from a
//! `ResponseRecorder`. Nothing binds a port.
//!
//! ```ignore
//! use vista_test::TestClient;
//!
//! #[tokio::test]
//! async fn renders_home() {
//!     let client = TestClient::new(app());
//!
//!     client
//!         .get("/")
//!         .header("accept", "text/html")
//!         .send()
//!         .await
//!         .unwrap()
//!         .assert_status(200)
//!         .assert_body_contains("<h1>Home</h1>");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/vista-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
