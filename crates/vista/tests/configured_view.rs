//! Views built from loaded configuration.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use std::fs;
use vista::prelude::*;

fn request() -> Request {
    http::Request::builder()
        .uri("/")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn view_from_toml_settings() {
    let root = tempfile::tempdir().unwrap();
    let pages = root.path().join("pages");
    let partials = root.path().join("partials");
    fs::create_dir_all(&pages).unwrap();
    fs::create_dir_all(&partials).unwrap();
    fs::write(pages.join("home.html"), "{% include \"nav.html\" %}{{ Name }}").unwrap();
    fs::write(partials.join("nav.html"), "[nav] ").unwrap();

    let toml = format!(
        "[view]\ntemplate_dir = {:?}\ndefault_template = \"home.html\"\ninclude_paths = [{:?}]\n",
        pages.display().to_string(),
        partials.display().to_string(),
    );
    let config = ConfigLoader::new()
        .with_string(&toml, "toml")
        .unwrap()
        .load()
        .unwrap();

    let pipeline = Pipeline::builder()
        .stage(ViewMiddleware::from_settings(&config.view))
        .handler(|ctx, _writer, _req| {
            Box::pin(async move {
                if let Some(stash) = ctx.stash_mut() {
                    stash.insert("Name", "world");
                }
            })
        })
        .build();

    let response = pipeline.handle(request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "[nav] world");
}

#[tokio::test]
async fn strict_undefined_from_development_preset() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("page.html"), "{{ nothing }}").unwrap();

    let mut config = VistaConfig::development();
    config.view.template_dir = root.path().to_path_buf();
    config.view.default_template = "page.html".to_string();

    let pipeline = Pipeline::builder()
        .stage(ViewMiddleware::from_settings(&config.view))
        .build();

    let response = pipeline.handle(request()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn telemetry_config_from_settings() {
    let config = VistaConfig::production();
    let telemetry = config.telemetry_config();
    assert!(telemetry.logging.json_format);
    assert!(telemetry.metrics.enabled);
}
