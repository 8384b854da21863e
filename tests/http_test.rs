//! Router-level contract: status codes, content types and the CORS header.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use murmur::config::{NotifyConfig, ServerConfig};
use murmur::notify::Notifier;
use murmur::serve::{router, AppState};
use murmur::store::CommentStore;
use serde_json::json;
use tower::ServiceExt;

const ORIGIN: &str = "https://blog.example.org";

async fn test_state(notifier: Notifier, cors_origin: &str) -> AppState {
    AppState {
        store: CommentStore::in_memory().await.unwrap(),
        notifier,
        config: ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            instance_name: "demo".to_string(),
            database: "sqlite::memory:".to_string(),
            cors_origin: cors_origin.to_string(),
            service_url: Some("https://comments.example.org".to_string()),
            notify: None,
        },
    }
}

async fn test_router() -> Router {
    router(test_state(Notifier::disabled(), ORIGIN).await).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::ORIGIN, ORIGIN)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::ORIGIN, ORIGIN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn submit_accepts_valid_comments() {
    let app = test_router().await;
    let body = json!({ "message": "hello", "target": "blog/post-1" }).to_string();
    let response = app.oneshot(post_json("/comments", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn submit_rejects_malformed_bodies() {
    let app = test_router().await;
    let response = app
        .oneshot(post_json("/comments", "not json".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notification_failure_surfaces_as_opaque_server_error() {
    let notifier = Notifier::from_config(Some(NotifyConfig {
        gateway_url: "http://127.0.0.1:9/send".to_string(),
        sender: "comments@example.org".to_string(),
        recipient: "moderator@example.org".to_string(),
    }));
    let app = router(test_state(notifier, ORIGIN).await).unwrap();
    let body = json!({ "message": "hello", "target": "blog/post-1" }).to_string();
    let response = app.oneshot(post_json("/comments", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn moderation_failures_are_opaque() {
    let app = test_router().await;
    let response = app
        .oneshot(get("/token/some-id/some-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn listing_carries_the_configured_cors_origin() {
    let app = test_router().await;
    let response = app.oneshot(get("/comments/blog/post-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some(ORIGIN)
    );
}

#[tokio::test]
async fn invalid_cors_origin_refuses_to_build() {
    let state = test_state(Notifier::disabled(), "not\na\nheader").await;
    assert!(router(state).is_err());
}

#[tokio::test]
async fn feed_is_served_as_atom_xml() {
    let app = test_router().await;
    let response = app.oneshot(get("/feed/blog/post-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/atom+xml")
    );
}

#[tokio::test]
async fn unknown_routes_are_unsupported() {
    let app = test_router().await;
    let response = app.oneshot(get("/nonsense")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
