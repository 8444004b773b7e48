use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Health check route.
pub mod health;
/// Quiz, content and catalog routes.
pub mod quiz;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router().merge(quiz::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
