//! Configuration API routes
//!
//! Reports which provider models are in use and whether a key is configured.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub text_model: String,
    pub image_model: String,
    pub api_key_configured: bool,
}

/// Get the generation provider configuration (never the key itself)
pub async fn get_provider_status(State(state): State<Arc<AppState>>) -> Json<ProviderStatus> {
    Json(ProviderStatus {
        text_model: state.config.text_model.clone(),
        image_model: state.config.image_model.clone(),
        api_key_configured: state.config.has_api_key(),
    })
}
