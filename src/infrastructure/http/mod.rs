//! HTTP REST API routes

mod collection_routes;
mod config_routes;
mod download_routes;
mod generation_routes;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Tiers
        .route("/api/rarities", get(collection_routes::list_rarities))
        // Collection
        .route("/api/collection", get(collection_routes::get_collection))
        .route("/api/entries", delete(collection_routes::clear_collection))
        .route("/api/entries/{id}", get(collection_routes::get_entry))
        // Generation
        .route("/api/batches", post(generation_routes::start_batch))
        .route(
            "/api/entries/{id}/model-sheet",
            post(generation_routes::generate_model_sheet),
        )
        // Downloads
        .route(
            "/api/entries/{id}/download",
            get(download_routes::download_entry_image),
        )
        // Provider
        .route("/api/provider", get(config_routes::get_provider_status))
}

/// Build the full application router with middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
