//! The `/buttonPressed` endpoint, exercised in-process

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use web_play_rec::server::router;

async fn post_button_pressed(body: &str, content_type: Option<&str>) -> (StatusCode, Option<Value>) {
    let mut request = Request::builder().method("POST").uri("/buttonPressed");
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = router().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_body = serde_json::from_slice(&body).ok();

    (status, json_body)
}

#[tokio::test]
async fn test_numeric_payload() {
    let (status, body) =
        post_button_pressed(r#"{"pan": -1, "volume": 0.5}"#, Some("application/json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({"success": true})));
}

#[tokio::test]
async fn test_string_payload() {
    let (status, body) =
        post_button_pressed(r#"{"pan": "0", "volume": "1"}"#, Some("application/json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({"success": true})));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (status, _) = post_button_pressed("{pan: ", Some("application/json")).await;
    assert!(status.is_client_error());

    let (status, _) = post_button_pressed(r#"{"pan": 0}"#, Some("application/json")).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let (status, _) = post_button_pressed(r#"{"pan": 0, "volume": 1}"#, None).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_other_routes() {
    let request = Request::builder()
        .method("GET")
        .uri("/buttonPressed")
        .body(Body::empty())
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
