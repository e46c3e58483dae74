//! Generation API routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::services::GenerationError;
use crate::domain::value_objects::Rarity;
use crate::infrastructure::http::collection_routes::{
    parse_entry_id, store_unavailable, CollectionResponse, EntryResponse,
};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartBatchRequest {
    #[serde(default)]
    pub rarity: Rarity,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchQuery {
    /// Wait for the batch to finish instead of returning immediately
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelSheetQuery {
    /// Generate again even if a sheet exists or is in flight
    #[serde(default)]
    pub regenerate: bool,
}

fn generation_error(e: GenerationError) -> (StatusCode, String) {
    match e {
        GenerationError::BatchInProgress => (StatusCode::CONFLICT, e.to_string()),
        GenerationError::EntryNotFound(_) => (StatusCode::NOT_FOUND, "Entry not found".to_string()),
        GenerationError::BatchFailed { message, .. }
        | GenerationError::ModelSheetFailed { message, .. } => {
            (StatusCode::BAD_GATEWAY, message.to_string())
        }
        GenerationError::StoreClosed | GenerationError::TaskAborted(_) => store_unavailable(e),
    }
}

/// Start a batch for the selected rarity
///
/// Returns 202 with the loading collection, or 409 if a batch is already
/// running. With `?wait=true` the response is sent once the batch settled;
/// a failed batch still answers 200 with the error banner set. The batch
/// runs on its own task and settles even if the client goes away.
pub async fn start_batch(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BatchQuery>,
    Json(request): Json<StartBatchRequest>,
) -> Result<(StatusCode, Json<CollectionResponse>), (StatusCode, String)> {
    let rarity = request.rarity;

    if query.wait {
        match state.generation_service.run_batch(rarity).await {
            Ok(outcome) => {
                tracing::debug!(
                    %rarity,
                    created = outcome.entry_ids.len(),
                    failed_images = outcome.failed_images,
                    "Batch finished for waiting client"
                );
            }
            Err(GenerationError::BatchFailed { .. }) => {}
            Err(e) => return Err(generation_error(e)),
        }
        let snapshot = state.collection.snapshot().await.map_err(store_unavailable)?;
        return Ok((StatusCode::OK, Json(snapshot.into())));
    }

    // Detached; the task reports its own failure through the collection
    state
        .generation_service
        .start_batch(rarity)
        .await
        .map_err(generation_error)?;

    let snapshot = state.collection.snapshot().await.map_err(store_unavailable)?;
    Ok((StatusCode::ACCEPTED, Json(snapshot.into())))
}

/// Generate the multi-angle reference sheet for an entry
///
/// An entry that already has a sheet, or has one in flight, is returned as is
/// unless `?regenerate=true`.
pub async fn generate_model_sheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ModelSheetQuery>,
) -> Result<Json<EntryResponse>, (StatusCode, String)> {
    let id = parse_entry_id(&id)?;

    let view = state
        .collection
        .entry(id)
        .await
        .map_err(store_unavailable)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Entry not found".to_string()))?;

    if !query.regenerate && (view.entry.has_model_sheet() || view.is_model_loading) {
        return Ok(Json(view.into()));
    }

    let view = state
        .generation_service
        .run_model_sheet(id)
        .await
        .map_err(generation_error)?;

    Ok(Json(view.into()))
}
