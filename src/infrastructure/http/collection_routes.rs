//! Collection API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::application::services::{CollectionSnapshot, EntryView};
use crate::domain::value_objects::{EntryId, Rarity, RarityProfile};
use crate::infrastructure::state::AppState;

// ==================== Response DTOs ====================

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: String,
    pub name: String,
    pub lore: String,
    pub visual_prompt: String,
    pub rarity: Rarity,
    /// Empty when artwork generation failed
    pub image_url: String,
    pub model_sheet_url: Option<String>,
    pub is_model_loading: bool,
    pub timestamp: i64,
}

impl From<EntryView> for EntryResponse {
    fn from(view: EntryView) -> Self {
        let e = view.entry;
        Self {
            id: e.id.to_string(),
            name: e.name,
            lore: e.lore,
            visual_prompt: e.visual_prompt,
            rarity: e.rarity,
            image_url: e.image_url,
            model_sheet_url: e.model_sheet_url,
            is_model_loading: view.is_model_loading,
            timestamp: e.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub entries: Vec<EntryResponse>,
    pub count: usize,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl From<CollectionSnapshot> for CollectionResponse {
    fn from(snapshot: CollectionSnapshot) -> Self {
        Self {
            count: snapshot.entries.len(),
            entries: snapshot.entries.into_iter().map(EntryResponse::from).collect(),
            is_loading: snapshot.is_loading,
            error: snapshot.error,
        }
    }
}

pub(crate) fn parse_entry_id(id: &str) -> Result<EntryId, (StatusCode, String)> {
    EntryId::parse(id).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid entry ID".to_string()))
}

pub(crate) fn store_unavailable(e: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ==================== Routes ====================

/// List the rarity tiers with their profiles
pub async fn list_rarities() -> Json<Vec<RarityProfile>> {
    Json(Rarity::ALL.iter().map(|r| r.profile()).collect())
}

/// Get the whole collection, newest first
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CollectionResponse>, (StatusCode, String)> {
    let snapshot = state.collection.snapshot().await.map_err(store_unavailable)?;
    Ok(Json(snapshot.into()))
}

/// Get a single entry
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EntryResponse>, (StatusCode, String)> {
    let id = parse_entry_id(&id)?;

    let view = state
        .collection
        .entry(id)
        .await
        .map_err(store_unavailable)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Entry not found".to_string()))?;

    Ok(Json(view.into()))
}

/// Remove every entry
pub async fn clear_collection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CollectionResponse>, (StatusCode, String)> {
    state.collection.clear().await.map_err(store_unavailable)?;
    tracing::info!("Collection cleared");

    let snapshot = state.collection.snapshot().await.map_err(store_unavailable)?;
    Ok(Json(snapshot.into()))
}
