use crate::{
    models::options::OptionError,
    services::{artifact_store::ArtifactError, pdf_service::PdfError},
};
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for request errors that keeps the message local.
///
/// The message is what the client sees; processing details are logged
/// server-side by [`AppError::processing`] and never echoed back.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Log `err` and produce a 500 carrying only the generic `msg`.
    pub fn processing(msg: &str, err: impl fmt::Display) -> Self {
        tracing::error!(error = %err, "{}", msg);
        Self::internal(msg)
    }

    /// Map a failed document operation. Undecodable images are the client's
    /// fault; everything else is reported as `failure`.
    pub fn pdf(failure: &str, err: PdfError) -> Self {
        match err {
            PdfError::Image(detail) => {
                tracing::warn!(error = %detail, "rejected image upload");
                Self::bad_request(format!("Unsupported image: {detail}"))
            }
            other => Self::processing(failure, other),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<ArtifactError> for AppError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound(_) => AppError::not_found("File not found or expired"),
        }
    }
}

impl From<OptionError> for AppError {
    fn from(err: OptionError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!(error = %err, "rejected multipart body");
        AppError::bad_request(format!("Invalid form data: {}", err.body_text()))
    }
}
