//! Route handlers.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use super::error::ApiError;
use super::AppState;

/// Multipart field that carries the image.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct CaptionResponse {
    pub caption: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub vocabulary_size: usize,
    pub vocabulary_hash: String,
    pub max_length: usize,
}

/// `POST /generate-caption`
pub async fn generate_caption(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CaptionResponse>, ApiError> {
    let mut multipart = multipart?;
    let (name, bytes) = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("Missing image upload in field \"file\""))?;

    let outcome = state.captioner.caption_bytes(bytes, &name).await?;
    tracing::info!(
        file = %name,
        caption = %outcome.caption,
        steps = outcome.steps,
        total_ms = outcome.timings.total_ms,
        "Caption generated"
    );

    Ok(Json(CaptionResponse {
        caption: outcome.caption,
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: captioner_core::VERSION,
        vocabulary_size: state.captioner.vocabulary().len(),
        vocabulary_hash: state.vocabulary_hash.to_string(),
        max_length: state.captioner.max_length(),
    })
}

/// First part named `file`, or failing that the first part with a filename.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<(String, Vec<u8>)>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some(FILE_FIELD) || field.file_name().is_some();
        if !is_file {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        return Ok(Some((name, bytes.to_vec())));
    }
    Ok(None)
}
