//! HTTP backend for a browser-based PDF utility site.
//!
//! Transforms run synchronously on tokio's blocking pool. Operations that
//! produce several files park them in an in-memory [`ArtifactStore`] for a
//! follow-up download.
//!
//! [`ArtifactStore`]: services::artifact_store::ArtifactStore

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::DefaultBodyLimit};
use state::AppState;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Room on top of the largest accepted file for multipart framing and the
/// text fields sent alongside it.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Assemble the full application: routes, shared state and middleware.
///
/// `max_upload_bytes` bounds a single uploaded file; the request body may
/// exceed it by [`MULTIPART_OVERHEAD_BYTES`] so per-endpoint size checks
/// report oversized files themselves.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let body_limit = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    routes::routes::routes()
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
