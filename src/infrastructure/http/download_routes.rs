//! Image download routes

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::value_objects::{download_file_name, DecodedImage};
use crate::infrastructure::http::collection_routes::{parse_entry_id, store_unavailable};
use crate::infrastructure::state::AppState;

/// Suffix added to the file name of model sheet downloads
const MODEL_SHEET_SUFFIX: &str = "-uefn-ref-sheet";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadVariant {
    #[default]
    Artwork,
    ModelSheet,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub variant: DownloadVariant,
}

/// Download an entry's artwork or model sheet as an attachment
pub async fn download_entry_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, (StatusCode, String)> {
    let id = parse_entry_id(&id)?;

    let entry = state
        .collection
        .entry(id)
        .await
        .map_err(store_unavailable)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Entry not found".to_string()))?
        .entry;

    let (data_uri, name) = match query.variant {
        DownloadVariant::Artwork => (entry.image_url, entry.name),
        DownloadVariant::ModelSheet => (
            entry.model_sheet_url.unwrap_or_default(),
            format!("{}{}", entry.name, MODEL_SHEET_SUFFIX),
        ),
    };

    if data_uri.is_empty() {
        return Err((StatusCode::NOT_FOUND, "No image available".to_string()));
    }

    let image = DecodedImage::from_data_uri(&data_uri).map_err(|e| {
        tracing::error!(entry_id = %id, error = %e, "Stored image could not be decoded");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let disposition = format!("attachment; filename=\"{}\"", download_file_name(&name));

    Ok((
        [
            (header::CONTENT_TYPE, image.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        image.bytes,
    )
        .into_response())
}
