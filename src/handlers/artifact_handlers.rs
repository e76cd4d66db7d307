//! Downloads of previously generated artifacts.
//!
//! Both id styles are served: `?id=` on the producing endpoint and a path
//! segment on the dedicated download route.

use super::response::attachment;
use crate::{
    errors::AppError, models::artifact::Artifact, services::artifact_store::ArtifactStore,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, header},
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct ArtifactQuery {
    pub id: Option<String>,
}

/// `GET /api/split-pdf?id=`
pub async fn fetch_split(
    State(state): State<AppState>,
    Query(query): Query<ArtifactQuery>,
) -> Result<Response, AppError> {
    serve(&state.splits, required_id(query)?.as_str())
}

/// `GET /api/download-split/{id}`
pub async fn download_split(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    serve(&state.splits, &id)
}

/// `GET /api/pdf-to-jpg?id=`
pub async fn fetch_image(
    State(state): State<AppState>,
    Query(query): Query<ArtifactQuery>,
) -> Result<Response, AppError> {
    serve(&state.images, required_id(query)?.as_str())
}

/// `GET /api/download-image/{id}`
pub async fn download_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    serve(&state.images, &id)
}

fn required_id(query: ArtifactQuery) -> Result<String, AppError> {
    query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("File ID is required"))
}

fn serve(store: &ArtifactStore, id: &str) -> Result<Response, AppError> {
    let artifact = store.get(id)?;
    debug!(store = store.name(), id, "serving artifact");
    Ok(artifact_response(artifact))
}

fn artifact_response(artifact: Artifact) -> Response {
    let etag = format!("\"{:x}\"", md5::compute(&artifact.payload));
    let mut response = attachment(artifact.content_type, &artifact.filename, artifact.payload);

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
