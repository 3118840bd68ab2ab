#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use replydesk_api::config::{LogFormat, ServerConfig};
use replydesk_api::middleware::actor::ACTOR_HEADER;
use replydesk_api::router::build_app_router;
use replydesk_api::state::AppState;
use replydesk_db::DbPool;
use replydesk_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        store_timeout_ms: 2000,
        publish_timeout_ms: 1000,
        database_url: None,
        notify_webhook_url: None,
        log_format: LogFormat::Text,
    }
}

/// Application state over a fresh in-memory store, publishing to an
/// in-process bus.
pub fn test_state() -> AppState {
    let bus = Arc::new(EventBus::default());
    AppState::new(
        DbPool::in_memory(),
        Arc::new(test_config()),
        Arc::clone(&bus),
        bus,
    )
}

/// Build the full application router with all middleware layers over
/// `state`.
///
/// Uses the same builder as `main.rs` so integration tests exercise the
/// same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config()).unwrap()
}

/// Send a request through the router, optionally as `actor` and with a
/// JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    actor: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header(ACTOR_HEADER, actor);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: Router, uri: &str, actor: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(actor), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    actor: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(actor), Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    actor: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(actor), Some(body)).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    actor: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(actor), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, actor: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(actor), None).await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a template through the API and return its `data` object.
pub async fn create_template(
    app: Router,
    actor: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let response = post_json(app, "/api/v1/templates", actor, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
