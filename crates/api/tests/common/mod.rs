#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use dealroom_api::auth::jwt::{generate_access_token, JwtConfig};
use dealroom_api::config::{LogFormat, ServerConfig};
use dealroom_api::router::build_app_router;
use dealroom_api::state::AppState;
use dealroom_core::types::DbId;
use dealroom_events::EventBus;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: String::new(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        webhook: None,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router (same middleware stack as `main.rs`).
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool).0
}

/// Like [`build_test_app`], also returning the event bus so tests can
/// subscribe to published events.
pub fn build_test_app_with_bus(pool: PgPool) -> (Router, Arc<EventBus>) {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };
    (build_app_router(state, &config), event_bus)
}

/// A valid Bearer token for `user_id`.
pub fn token_for(user_id: DbId) -> String {
    generate_access_token(user_id, "authenticated", &test_config().jwt)
        .expect("token generation should succeed")
}

/// Send a request as `user` (or anonymously), with an optional JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    user: Option<DbId>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user_id)));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str, user: DbId) -> Response<Body> {
    send(app, Method::GET, uri, Some(user), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    user: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(user), Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    user: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(user), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, user: DbId) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(user), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a deal owned by `owner` and return its id.
pub async fn create_deal(app: Router, owner: DbId, name: &str) -> DbId {
    let response = post_json(app, "/api/v1/deals", owner, serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a Q&A item in `deal_id` and return the `data` object.
pub async fn create_qa_item(
    app: Router,
    deal_id: DbId,
    user: DbId,
    body: serde_json::Value,
) -> serde_json::Value {
    let response = post_json(app, &format!("/api/v1/deals/{deal_id}/qa-items"), user, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
