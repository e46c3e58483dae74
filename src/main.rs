//! Brainrot Pokedex - Backend API for a session-only meme creature gallery
//!
//! The server:
//! - Asks a Gemini text model for batches of rarity-themed creature concepts
//! - Illustrates each concept with a Gemini image model
//! - Produces multi-angle model sheets on demand
//! - Keeps the resulting collection in memory for the lifetime of the process

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brainrot_pokedex=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Brainrot Pokedex");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Gemini: {}", config.gemini_base_url);
    tracing::info!("  Text model: {}", config.text_model);
    tracing::info!("  Image model: {}", config.image_model);
    if !config.has_api_key() {
        tracing::warn!("No GEMINI_API_KEY set; generation requests will be rejected upstream");
    }

    let port = config.server_port;

    // Initialize application state
    let state = Arc::new(AppState::new(config));
    tracing::info!("Application state initialized");

    let app = http::build_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app);

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
