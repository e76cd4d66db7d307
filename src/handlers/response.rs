//! Attachment responses and blocking-pool plumbing shared by the handlers.

use crate::{errors::AppError, services::pdf_service::PdfResult};
use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};

pub const PDF: &str = "application/pdf";
pub const JPEG: &str = "image/jpeg";
pub const TEXT: &str = "text/plain; charset=utf-8";
pub const CSV: &str = "text/csv; charset=utf-8";

/// Run CPU-bound document work off the async workers.
///
/// Only a panicking task is turned into an [`AppError`] here; the task's own
/// result is handed back so callers can map specific failures.
pub async fn blocking<T, F>(task: F) -> Result<PdfResult<T>, AppError>
where
    F: FnOnce() -> PdfResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AppError::processing("Background task failed", err))
}

/// [`blocking`], reporting any failure as `failure`.
pub async fn run_pdf_task<T, F>(failure: &'static str, task: F) -> Result<T, AppError>
where
    F: FnOnce() -> PdfResult<T> + Send + 'static,
    T: Send + 'static,
{
    blocking(task)
        .await?
        .map_err(|err| AppError::pdf(failure, err))
}

/// `200 OK` with the payload as a download.
pub fn attachment(content_type: &str, filename: &str, body: impl Into<Body>) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&content_disposition(filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// `attachment; filename="..."` with an ASCII fallback name, plus an
/// RFC 5987 `filename*` when the name is not plain ASCII.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            percent_encode(filename)
        )
    }
}

fn percent_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
