//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that round-trips a document through the PDF
//!   engine and reports artifact store sizes

use crate::{
    services::{
        document_builder::{A4, DocumentBuilder, PageCanvas},
        pdf_service,
    },
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /healthz`
///
/// Very small liveness probe, always 200 OK. Never touches the PDF engine.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that:
/// 1. Builds a one-page document, serializes it and parses it back.
/// 2. Reports how many artifacts each store currently holds.
///
/// HTTP 200 when the engine check passes, HTTP 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let engine_check = match tokio::task::spawn_blocking(engine_self_test).await {
        Ok(Ok(())) => CheckStatus {
            ok: true,
            error: None,
        },
        Ok(Err(e)) => CheckStatus {
            ok: false,
            error: Some(e),
        },
        Err(e) => CheckStatus {
            ok: false,
            error: Some(format!("self-test task failed: {e}")),
        },
    };
    let overall_ok = engine_check.ok;

    let mut checks = HashMap::new();
    checks.insert("pdf_engine", engine_check);

    let artifacts = HashMap::from([
        (state.splits.name(), state.splits.len()),
        (state.images.name(), state.images.len()),
    ]);

    let body = ReadyResponse {
        status: if overall_ok { "ok" } else { "error" }.into(),
        checks,
        artifacts,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

fn engine_self_test() -> Result<(), String> {
    let bytes = DocumentBuilder::new()
        .page(PageCanvas::new(A4))
        .finish()
        .map_err(|e| format!("build: {e}"))?;
    match pdf_service::page_count(&bytes) {
        Ok(1) => Ok(()),
        Ok(n) => Err(format!("unexpected page count: {n}")),
        Err(e) => Err(format!("parse: {e}")),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
    artifacts: HashMap<&'static str, usize>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
