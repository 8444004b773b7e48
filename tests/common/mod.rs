use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use serde_json::Value;

use futquiz::{
    build_router, config::AppConfig, dao::quiz_store::memory::MemoryQuizStore, state::AppState,
};

/// Router backed by an empty in-memory quiz store.
pub async fn create_test_app() -> Router {
    let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryQuizStore::new())).await;
    build_router(state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
