mod common;

use ai_translate_overlay::bridge::HttpChannel;
use ai_translate_overlay::handlers::AppState;
use ai_translate_overlay::message::{MessageChannel, Request};
use axum::{
    body::Body,
    http::{Request as HttpRequest, StatusCode},
};
use common::{closed_base_url, gateway_for, serve_router, MockCompanion};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

const TIMEOUT: Duration = Duration::from_secs(30);

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn app_for(base_url: &str) -> axum::Router {
    let (gateway, _store) = gateway_for(base_url, TIMEOUT);
    ai_translate_overlay::create_app(AppState::new(gateway))
}

#[tokio::test]
async fn test_message_endpoint_translates() {
    let mock = MockCompanion::returning(
        json!({"success": true, "subtitles": [{"start": 0, "end": 2, "text": "hi"}]}),
    );
    let app = app_for(&mock.spawn().await).await;

    let request = HttpRequest::builder()
        .method("POST")
        .uri("/api/message")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"type": "translate", "videoId": "v1"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["subtitles"][0]["text"], "hi");
}

#[tokio::test]
async fn test_unknown_message_type_is_reported() {
    let app = app_for(&closed_base_url().await).await;

    let request = HttpRequest::builder()
        .method("POST")
        .uri("/api/message")
        .header("content-type", "application/json")
        .body(Body::from(json!({"type": "read_json"}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("不明なメッセージ"));
}

#[tokio::test]
async fn test_status_endpoint_without_cache() {
    let app = app_for(&closed_base_url().await).await;

    let request = HttpRequest::builder()
        .uri("/api/status/v1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": false}));
}

#[tokio::test]
async fn test_delete_endpoint_succeeds_when_server_offline() {
    let app = app_for(&closed_base_url().await).await;

    let request = HttpRequest::builder()
        .method("DELETE")
        .uri("/api/translation/v1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await, json!({"success": true}));
}

#[tokio::test]
async fn test_health_endpoint_reports_offline_server() {
    let app = app_for(&closed_base_url().await).await;

    let request = HttpRequest::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "error": "サーバー未起動"})
    );
}

#[tokio::test]
async fn test_http_channel_round_trip() {
    let mock = MockCompanion::returning(
        json!({"success": true, "subtitles": [{"start": 1, "end": 3, "text": "こんにちは"}]}),
    );
    let bridge = serve_router(app_for(&mock.spawn().await).await).await;
    let channel = HttpChannel::new(&bridge, TIMEOUT).unwrap();

    let translated = channel
        .send(Request::Translate {
            video_id: "v9".to_string(),
        })
        .await;
    assert!(translated.success);

    let status = channel
        .send(Request::GetStatus {
            video_id: "v9".to_string(),
        })
        .await;
    assert!(status.success);
    assert_eq!(status.data.unwrap()["subtitles"][0]["text"], "こんにちは");
    assert_eq!(mock.download_count(), 1);

    let health = channel.send(Request::CheckServerStatus).await;
    assert_eq!(health.message.as_deref(), Some("AI翻訳サーバー起動中"));
}

#[tokio::test]
async fn test_http_channel_reports_unreachable_bridge() {
    let channel = HttpChannel::new(&closed_base_url().await, TIMEOUT).unwrap();

    let response = channel.send(Request::CheckServerStatus).await;
    assert!(!response.success);
    assert!(response.error.is_some());
}
