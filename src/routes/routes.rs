//! Defines routes for every PDF utility endpoint.
//!
//! ## Structure
//! - **Document transforms** (`POST /api/...`)
//!   - `merge-pdf`, `split-pdf`, `rotate-pdf`, `compress-pdf`
//!   - `protect-pdf`, `unlock-pdf`, `enhance-pdf`, `get-page-count`
//!
//! - **Conversions** (`POST /api/...`)
//!   - `word-to-pdf`, `excel-to-pdf`, `powerpoint-to-pdf`
//!   - `pdf-to-word`, `pdf-to-excel`, `pdf-to-powerpoint`
//!   - `pdf-to-jpg`, `jpg-to-pdf`
//!
//! - **Artifact downloads**
//!   - `GET /api/split-pdf?id=` and `GET /api/download-split/{id}`
//!   - `GET /api/pdf-to-jpg?id=` and `GET /api/download-image/{id}`

use crate::{
    handlers::{
        artifact_handlers::{download_image, download_split, fetch_image, fetch_split},
        convert_handlers::{
            excel_to_pdf, jpg_to_pdf, pdf_to_excel, pdf_to_jpg, pdf_to_powerpoint, pdf_to_word,
            powerpoint_to_pdf, word_to_pdf,
        },
        health_handlers::{healthz, readyz},
        pdf_handlers::{
            compress_pdf, enhance_pdf, get_page_count, merge_pdf, protect_pdf, rotate_pdf,
            split_pdf, unlock_pdf,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all endpoints.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        // Document transforms
        .route("/merge-pdf", post(merge_pdf))
        .route("/split-pdf", post(split_pdf).get(fetch_split))
        .route("/download-split/{id}", get(download_split))
        .route("/rotate-pdf", post(rotate_pdf))
        .route("/compress-pdf", post(compress_pdf))
        .route("/protect-pdf", post(protect_pdf))
        .route("/unlock-pdf", post(unlock_pdf))
        .route("/enhance-pdf", post(enhance_pdf))
        .route("/get-page-count", post(get_page_count))
        // Conversions
        .route("/word-to-pdf", post(word_to_pdf))
        .route("/excel-to-pdf", post(excel_to_pdf))
        .route("/powerpoint-to-pdf", post(powerpoint_to_pdf))
        .route("/pdf-to-word", post(pdf_to_word))
        .route("/pdf-to-excel", post(pdf_to_excel))
        .route("/pdf-to-powerpoint", post(pdf_to_powerpoint))
        .route("/pdf-to-jpg", post(pdf_to_jpg).get(fetch_image))
        .route("/download-image/{id}", get(download_image))
        .route("/jpg-to-pdf", post(jpg_to_pdf));

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api)
}
