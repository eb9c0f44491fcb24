//! HTTP control surface tests, driven through the router with `oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use radioshark_hid::RadioShark;
use radioshark_hid::mock::MockHidDevice;
use rsharkd::config::MemoryStore;
use rsharkd::http::{ErrorBody, router};
use rsharkd::{CommitPolicy, Configuration, ServerState};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const BOUNDARY: &str = "rsharkd-test-boundary";

struct Harness {
    app: Router,
    server: Arc<ServerState>,
    probe: MockHidDevice,
    store: Arc<MemoryStore>,
}

fn harness() -> Result<Harness, Box<dyn std::error::Error>> {
    let probe = MockHidDevice::new("/dev/hidraw0");
    let store = Arc::new(MemoryStore::new());
    let server = Arc::new(ServerState::start(
        Configuration::default(),
        RadioShark::new(Box::new(probe.clone())),
        Box::new(Arc::clone(&store)),
        CommitPolicy::Optimistic,
    )?);
    probe.clear_history();
    Ok(Harness {
        app: router(Arc::clone(&server)),
        server,
        probe,
        store,
    })
}

fn json_request(
    method: Method,
    uri: &str,
    body: &serde_json::Value,
) -> Result<Request<Body>, Box<dyn std::error::Error>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

fn form_request(fields: &[(&str, &str)]) -> Result<Request<Body>, Box<dyn std::error::Error>> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Ok(Request::builder()
        .method(Method::POST)
        .uri("/config/apply")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))?)
}

async fn send<T: DeserializeOwned>(
    app: &Router,
    request: Request<Body>,
) -> Result<(StatusCode, T), Box<dyn std::error::Error>> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

fn full_config(modulation: &str, frequency: &str, intensity: u32) -> serde_json::Value {
    serde_json::json!({
        "modulation": modulation,
        "frequency": frequency,
        "blue-led-intensity": intensity,
        "blue-led-pulse-rate": 0,
        "red-led": false
    })
}

#[tokio::test]
async fn get_returns_current_configuration() -> TestResult {
    let h = harness()?;
    let request = Request::builder().uri("/config/get").body(Body::empty())?;

    let (status, config): (_, Configuration) = send(&h.app, request).await?;

    assert_eq!(status, StatusCode::OK);
    insta::assert_json_snapshot!(config, @r#"
    {
      "modulation": "FM",
      "frequency": "88.0",
      "blue-led-intensity": 127,
      "blue-led-pulse-rate": 0,
      "red-led": false
    }
    "#);
    Ok(())
}

#[tokio::test]
async fn put_apply_replaces_configuration() -> TestResult {
    let h = harness()?;
    let request = json_request(Method::PUT, "/config/apply", &full_config("am", "600", 10))?;

    let (status, applied): (_, Configuration) = send(&h.app, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(applied.modulation, "am");
    assert_eq!(applied.blue_led_intensity, 10);
    assert_eq!(h.server.get(), applied);
    assert_eq!(h.store.record(), Some(applied));
    assert_eq!(h.probe.written_opcodes(), vec![0xC0, 0xA0, 0xA1, 0xA8]);
    Ok(())
}

#[tokio::test]
async fn put_apply_reports_every_validation_failure() -> TestResult {
    let h = harness()?;
    let request = json_request(Method::PUT, "/config/apply", &full_config("XM", "88.0", 200))?;

    let (status, body): (_, ErrorBody) = send(&h.app, request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    insta::assert_json_snapshot!(body, @r#"
    {
      "error": "unknown modulation 'XM', blue LED intensity must be at most 127, got 200",
      "details": [
        "unknown modulation 'XM'",
        "blue LED intensity must be at most 127, got 200"
      ]
    }
    "#);
    assert!(h.probe.get_write_history().is_empty());
    assert_eq!(h.server.get(), Configuration::default());
    Ok(())
}

#[tokio::test]
async fn put_apply_rejects_incomplete_and_out_of_byte_bodies() -> TestResult {
    let h = harness()?;

    let partial = serde_json::json!({ "modulation": "FM", "frequency": "99.9" });
    let request = json_request(Method::PUT, "/config/apply", &partial)?;
    let (status, body): (_, ErrorBody) = send(&h.app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.details.len(), 1);

    let request = json_request(Method::PUT, "/config/apply", &full_config("FM", "99.9", 300))?;
    let (status, _body): (_, ErrorBody) = send(&h.app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(h.probe.get_write_history().is_empty());
    Ok(())
}

#[tokio::test]
async fn post_apply_overlays_form_fields() -> TestResult {
    let h = harness()?;
    let request = form_request(&[
        ("frequency", "101.1"),
        ("red-led", "on"),
        ("submit", "Apply"),
    ])?;

    let (status, applied): (_, Configuration) = send(&h.app, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        applied,
        Configuration {
            frequency: "101.1".to_string(),
            red_led: true,
            ..Configuration::default()
        }
    );
    assert_eq!(h.server.get(), applied);
    assert_eq!(h.probe.written_opcodes(), vec![0xC0, 0xA0, 0xA1, 0xA9]);
    Ok(())
}

#[tokio::test]
async fn post_apply_rejects_malformed_field() -> TestResult {
    let h = harness()?;
    let request = form_request(&[("blue-led-pulse-rate", "fast")])?;

    let (status, body): (_, ErrorBody) = send(&h.app, request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.contains("blue-led-pulse-rate"), "{}", body.error);
    assert!(h.probe.get_write_history().is_empty());
    Ok(())
}

#[tokio::test]
async fn post_apply_without_multipart_is_bad_request() -> TestResult {
    let h = harness()?;
    let request = json_request(Method::POST, "/config/apply", &full_config("FM", "99.9", 0))?;

    let (status, _body): (_, ErrorBody) = send(&h.app, request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn validate_never_mutates() -> TestResult {
    let h = harness()?;

    let request = json_request(Method::PUT, "/config/validate", &full_config("FM", "99.9", 0))?;
    let (status, body): (_, serde_json::Value) = send(&h.app, request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({}));

    let request = json_request(Method::PUT, "/config/validate", &full_config("FM", "120.0", 0))?;
    let (status, body): (_, ErrorBody) = send(&h.app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.details,
        vec!["FM frequency must be between 88.0 and 108.0, got 120.0"]
    );

    assert!(h.probe.get_write_history().is_empty());
    assert_eq!(h.server.get(), Configuration::default());
    assert_eq!(h.store.save_count(), 1);
    Ok(())
}

#[tokio::test]
async fn device_failure_is_server_error() -> TestResult {
    let h = harness()?;
    h.probe.fail_opcode(0xA0);
    let request = json_request(Method::PUT, "/config/apply", &full_config("FM", "88.0", 5))?;

    let (status, body): (_, ErrorBody) = send(&h.app, request).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    insta::assert_snapshot!(
        body.error,
        @"blue LED intensity: Failed to write to device: injected failure for opcode 0xa0"
    );
    assert_eq!(h.probe.written_opcodes(), vec![0xA1, 0xA8]);
    Ok(())
}

#[tokio::test]
async fn persistence_failure_is_server_error() -> TestResult {
    let h = harness()?;
    h.store.set_fail_saves(true);
    let request = json_request(Method::PUT, "/config/apply", &full_config("FM", "95.5", 5))?;

    let (status, body): (_, ErrorBody) = send(&h.app, request).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.error.contains("injected save failure"), "{}", body.error);
    Ok(())
}

#[tokio::test]
async fn unsupported_method_is_rejected() -> TestResult {
    let h = harness()?;

    for (method, uri) in [
        (Method::GET, "/config/apply"),
        (Method::POST, "/config/get"),
        (Method::GET, "/config/validate"),
    ] {
        let request = Request::builder().method(method).uri(uri).body(Body::empty())?;
        let response = h.app.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
    }
    Ok(())
}
