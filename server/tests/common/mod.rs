use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use registry_server::config::Config;
use registry_server::routes::create_routes;
use registry_server::services::FixedClock;
use registry_server::state::AppState;
use registry_server::store::{MemoryStore, Store};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

/// Build a test `Config` with safe defaults.
pub fn test_config() -> Config {
    Config::from_lookup(|_| None)
}

/// Full router over an in-memory store whose clock is pinned to `today()`.
///
/// Clone the returned store handle into several apps to share records
/// between requests.
pub fn build_test_app(store: Arc<dyn Store>) -> Router {
    build_test_app_with_config(store, &test_config())
}

pub fn build_test_app_with_config(store: Arc<dyn Store>, config: &Config) -> Router {
    let state = AppState::new(store, Arc::new(FixedClock(today())));
    create_routes(state, config)
}

pub fn new_store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get_with_origin(app: Router, uri: &str, origin: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("origin", origin)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
