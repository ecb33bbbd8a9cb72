//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router, mounted under `/api`
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Ingestion
        .route("/upload", post(handlers::upload))
        // Conversation
        .route("/chat", post(handlers::chat))
        // Index management
        .route(
            "/documents",
            get(handlers::list_documents).delete(handlers::clear_documents),
        )
        .with_state(state)
}
