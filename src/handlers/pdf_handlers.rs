//! HTTP handlers for the document transforms.
//!
//! Each handler drains the multipart form, validates options, runs the
//! transform on the blocking pool and answers with either the finished file
//! or, for split, references into the split artifact store.

use super::{
    form::UploadForm,
    response::{PDF, attachment, blocking, run_pdf_task},
};
use crate::{
    errors::AppError,
    models::{
        artifact::ArtifactRef,
        options::{
            CompressionLevel, Permissions, Rotation, SplitMode, parse_page_list, parse_ranges,
        },
    },
    services::pdf_service::{self, PdfError, SplitPlan},
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, info};

/// Largest PDF accepted by `POST /api/split-pdf`.
pub const MAX_SPLIT_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct SplitResponse {
    pub files: Vec<ArtifactRef>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCountResponse {
    pub page_count: u32,
}

/// `POST /api/merge-pdf`
///
/// Concatenates every file whose field name starts with `file`, in the
/// order the parts were sent.
pub async fn merge_pdf(multipart: Multipart) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let inputs: Vec<_> = form
        .files_with_prefix("file")
        .map(|f| f.bytes.clone())
        .collect();

    if inputs.len() < 2 {
        return Err(AppError::bad_request("At least 2 PDF files are required"));
    }

    let count = inputs.len();
    let merged = run_pdf_task("Failed to merge PDFs", move || pdf_service::merge(&inputs)).await?;

    info!(files = count, bytes = merged.len(), "merged PDFs");
    Ok(attachment(PDF, "merged-document.pdf", merged))
}

/// `POST /api/split-pdf`
///
/// Splits according to `mode` (`all`, `range` or `pages`) and registers each
/// output in the split store. Ranges or pages outside the document are
/// skipped; the response may list fewer files than were asked for, or none.
pub async fn split_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SplitResponse>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;
    file.ensure_within(MAX_SPLIT_UPLOAD_BYTES)?;

    let mode = SplitMode::parse(form.require_text("mode", "Split mode is required")?)?;
    let plan = match mode {
        SplitMode::All => SplitPlan::All,
        SplitMode::Range => SplitPlan::Ranges(parse_ranges(
            form.require_text("range", "Page range is required for range mode")?,
        )?),
        SplitMode::Pages => SplitPlan::Pages(parse_page_list(
            form.require_text("pages", "Page list is required for pages mode")?,
        )?),
    };
    debug!(?plan, "parsed split options");

    let bytes = file.bytes.clone();
    let outputs = run_pdf_task("Failed to split PDF", move || {
        pdf_service::split(&bytes, &plan)
    })
    .await?;

    let files = state.splits.put_batch(
        PDF,
        outputs.into_iter().map(|o| (o.filename, o.bytes)),
    );

    info!(
        filename = %file.filename,
        ?mode,
        outputs = files.len(),
        "split PDF"
    );
    Ok(Json(SplitResponse { files }))
}

/// `POST /api/rotate-pdf`
pub async fn rotate_pdf(multipart: Multipart) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;
    let rotation = Rotation::parse(form.require_text("rotation", "Rotation angle is required")?)?;

    let bytes = file.bytes.clone();
    let rotated = run_pdf_task("Failed to rotate PDF", move || {
        pdf_service::rotate(&bytes, rotation)
    })
    .await?;

    info!(filename = %file.filename, degrees = rotation.degrees(), "rotated PDF");
    Ok(attachment(PDF, &format!("rotated-{}", file.filename), rotated))
}

/// `POST /api/compress-pdf`
pub async fn compress_pdf(multipart: Multipart) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;
    let level = CompressionLevel::from_field(form.text("level"));

    let bytes = file.bytes.clone();
    let compressed = run_pdf_task("Failed to compress PDF", move || {
        pdf_service::compress(&bytes, level)
    })
    .await?;

    info!(
        filename = %file.filename,
        level = level.as_str(),
        original_bytes = file.len(),
        compressed_bytes = compressed.len(),
        "compressed PDF"
    );
    Ok(attachment(PDF, &format!("compressed-{}", file.filename), compressed))
}

/// `POST /api/protect-pdf`
///
/// Marks the document as protected. No encryption is applied and the
/// requested permissions are only recorded in the log.
pub async fn protect_pdf(multipart: Multipart) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;
    form.raw_text("password")
        .ok_or_else(|| AppError::bad_request("Password is required"))?;
    let permissions = Permissions::from_field(form.text("permissions"))?;

    let bytes = file.bytes.clone();
    let filename = file.filename.clone();
    let protected = run_pdf_task("Failed to protect PDF", move || {
        pdf_service::protect(&bytes, &filename)
    })
    .await?;

    info!(filename = %file.filename, ?permissions, "protected PDF");
    Ok(attachment(PDF, &format!("protected-{}", file.filename), protected))
}

/// `POST /api/unlock-pdf`
pub async fn unlock_pdf(multipart: Multipart) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;
    let password = form
        .raw_text("password")
        .ok_or_else(|| AppError::bad_request("Password is required"))?;

    if !pdf_service::unlock_password_accepted(password) {
        return Err(AppError::unauthorized("Incorrect password"));
    }

    let bytes = file.bytes.clone();
    let filename = file.filename.clone();
    let unlocked = match blocking(move || pdf_service::unlock(&bytes, &filename)).await? {
        Ok(unlocked) => unlocked,
        Err(PdfError::Load(detail)) => {
            debug!(error = %detail, "unlock could not parse PDF");
            return Err(AppError::unauthorized(
                "Incorrect password or unreadable PDF",
            ));
        }
        Err(err) => return Err(AppError::pdf("Failed to unlock PDF", err)),
    };

    info!(filename = %file.filename, "unlocked PDF");
    Ok(attachment(PDF, &format!("unlocked-{}", file.filename), unlocked))
}

/// `POST /api/enhance-pdf`
pub async fn enhance_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;
    let enhance_type = form.text("enhanceType").unwrap_or("general").to_string();

    let bytes = file.bytes.clone();
    let now = state.now();
    let kind = enhance_type.clone();
    let enhanced = run_pdf_task("Failed to enhance PDF", move || {
        pdf_service::enhance(&bytes, &kind, now)
    })
    .await?;

    info!(filename = %file.filename, %enhance_type, "enhanced PDF");
    Ok(attachment(PDF, &format!("enhanced-{}", file.filename), enhanced))
}

/// `POST /api/get-page-count`
pub async fn get_page_count(multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    let form = UploadForm::read(multipart).await?;
    let bytes = form.require_file("file")?.bytes.clone();

    let page_count = run_pdf_task("Failed to read PDF", move || {
        pdf_service::page_count(&bytes)
    })
    .await?;

    Ok(Json(PageCountResponse { page_count }))
}
