//! Library crate for futquiz: the quiz server, the client-side session state
//! machine and its collaborators, exposed for the binaries and integration tests.

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Player-side session, persistence and rendering.
pub mod client;
pub mod config;
/// Quiz persistence.
pub mod dao;
pub mod domain;
/// HTTP request and response bodies.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum routers.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared server state.
pub mod state;

/// Build the top-level router and attach cross-cutting middleware layers.
pub fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
