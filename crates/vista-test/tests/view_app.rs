//! A small view-driven app exercised through the test client.

use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use std::net::SocketAddr;
use vista_middleware::stages::{RequestIdMiddleware, REQUEST_ID_HEADER};
use vista_middleware::Pipeline;
use vista_test::TestClient;
use vista_view::{keys, StashExt, Value, ViewMiddleware};

const TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../vista-view/tests/templates");

fn app() -> Pipeline {
    let view = ViewMiddleware::builder()
        .template_dir(TEMPLATES)
        .default_template("test.tmpl")
        .build();

    Pipeline::builder()
        .stage(RequestIdMiddleware::trust_incoming())
        .stage(view)
        .handler(|ctx, writer, req| {
            Box::pin(async move {
                match req.uri().path() {
                    "/hello" => {
                        let name = req.uri().query().unwrap_or("nobody").to_string();
                        if let Some(stash) = ctx.stash_mut() {
                            stash.insert(keys::TEMPLATE, "hello.tmpl");
                            stash.insert("Name", name);
                        }
                    }
                    "/whoami" => {
                        if let Some(stash) = ctx.stash_mut() {
                            stash.insert(keys::TEMPLATE, "req.tmpl");
                        }
                    }
                    "/gone" => {
                        if let Some(stash) = ctx.stash_mut() {
                            stash.insert(keys::TEMPLATE, "hello.tmpl");
                            stash.insert(keys::STATUS, Value::from(410));
                            stash.insert("Name", "ghost");
                        }
                    }
                    "/api" => {
                        writer
                            .headers_mut()
                            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                        writer.write_header(StatusCode::OK);
                        let _ = writer.write_all(br#"{"ok":true}"#);
                    }
                    "/missing" => {
                        if let Some(stash) = ctx.stash_mut() {
                            stash.insert(keys::TEMPLATE, "oink.tmpl");
                        }
                    }
                    _ => {}
                }
            })
        })
        .build()
}

#[tokio::test]
async fn default_page() {
    let client = TestClient::new(app());
    let response = client.get("/").send().await.unwrap();

    response
        .assert_status(200)
        .assert_header("content-type", "text/html; charset=utf-8")
        .assert_body("Test template");
    assert!(response.header(REQUEST_ID_HEADER).is_some());
}

#[tokio::test]
async fn page_from_stash() {
    let client = TestClient::new(app());
    client
        .get("/hello?Ada")
        .send()
        .await
        .unwrap()
        .assert_status(200)
        .assert_body("Hello, Ada!");
}

#[tokio::test]
async fn request_details_in_template() {
    let addr: SocketAddr = "203.0.113.9:5150".parse().unwrap();
    let client = TestClient::new(app()).with_remote_addr(addr);

    client
        .post("/whoami")
        .send()
        .await
        .unwrap()
        .assert_status(200)
        .assert_body("POST /whoami from 203.0.113.9:5150");
}

#[tokio::test]
async fn status_override() {
    let client = TestClient::new(app());
    client
        .get("/gone")
        .send()
        .await
        .unwrap()
        .assert_status(410)
        .assert_header("content-type", "text/html; charset=utf-8")
        .assert_body("Hello, ghost!");
}

#[tokio::test]
async fn handler_response_is_left_alone() {
    let client = TestClient::new(app());
    let response = client.get("/api").send().await.unwrap();

    response
        .assert_status(200)
        .assert_header("content-type", "application/json")
        .assert_body(r#"{"ok":true}"#);
    let json: serde_json::Value = response.json().unwrap();
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn missing_template_is_server_error() {
    let client = TestClient::new(app());
    client
        .get("/missing")
        .send()
        .await
        .unwrap()
        .assert_status(500)
        .assert_header("content-type", "text/plain; charset=utf-8")
        .assert_body_contains("oink.tmpl");
}

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let id = "0190b3c1-7d52-7cc0-8000-000000000001";
    let client = TestClient::new(app()).with_default_header(REQUEST_ID_HEADER, id);

    client
        .get("/")
        .send()
        .await
        .unwrap()
        .assert_header(REQUEST_ID_HEADER, id);
}

#[tokio::test]
async fn invalid_header_fails_before_sending() {
    let client = TestClient::new(app());
    let result = client.get("/").header("bad header", "x").send().await;
    assert!(result.is_err());
}
