//! HTTP handlers for the format conversions.

use super::{
    form::UploadForm,
    response::{CSV, JPEG, PDF, TEXT, attachment, run_pdf_task},
};
use crate::{
    errors::AppError,
    models::artifact::ArtifactRef,
    services::{
        convert_service::{
            self, EXCEL_EXTENSIONS, POWERPOINT_EXTENSIONS, UploadSummary, WORD_EXTENSIONS,
            renamed,
        },
        image_service, pdf_service,
        pdf_service::PdfResult,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

/// Largest PDF accepted by `POST /api/pdf-to-jpg`.
pub const MAX_PDF_TO_JPG_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<ArtifactRef>,
}

/// Which Office placeholder to produce.
#[derive(Debug, Clone, Copy)]
enum OfficeKind {
    Word,
    Excel,
    PowerPoint,
}

impl OfficeKind {
    fn extensions(self) -> &'static [&'static str] {
        match self {
            OfficeKind::Word => WORD_EXTENSIONS,
            OfficeKind::Excel => EXCEL_EXTENSIONS,
            OfficeKind::PowerPoint => POWERPOINT_EXTENSIONS,
        }
    }

    fn failure(self) -> &'static str {
        match self {
            OfficeKind::Word => "Failed to convert Word to PDF",
            OfficeKind::Excel => "Failed to convert Excel to PDF",
            OfficeKind::PowerPoint => "Failed to convert PowerPoint to PDF",
        }
    }

    fn render(self, upload: &UploadSummary<'_>) -> PdfResult<Vec<u8>> {
        match self {
            OfficeKind::Word => convert_service::word_to_pdf(upload),
            OfficeKind::Excel => convert_service::excel_to_pdf(upload),
            OfficeKind::PowerPoint => convert_service::powerpoint_to_pdf(upload),
        }
    }
}

async fn office_to_pdf(
    state: AppState,
    multipart: Multipart,
    kind: OfficeKind,
) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;

    let filename = file.filename.clone();
    let size_bytes = file.len();
    let converted_at = state.now();
    let pdf = run_pdf_task(kind.failure(), move || {
        kind.render(&UploadSummary {
            filename: &filename,
            size_bytes,
            converted_at,
        })
    })
    .await?;

    info!(filename = %file.filename, ?kind, "rendered placeholder PDF");
    Ok(attachment(
        PDF,
        &renamed(&file.filename, kind.extensions(), "pdf"),
        pdf,
    ))
}

/// `POST /api/word-to-pdf`
pub async fn word_to_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    office_to_pdf(state, multipart, OfficeKind::Word).await
}

/// `POST /api/excel-to-pdf`
pub async fn excel_to_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    office_to_pdf(state, multipart, OfficeKind::Excel).await
}

/// `POST /api/powerpoint-to-pdf`
pub async fn powerpoint_to_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    office_to_pdf(state, multipart, OfficeKind::PowerPoint).await
}

/// Shared body of the PDF -> text exports: count pages, then describe.
async fn pdf_summary(
    state: AppState,
    multipart: Multipart,
    failure: &'static str,
    content_type: &'static str,
    extension: &str,
    describe: fn(&str, u32, DateTime<Utc>) -> String,
) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;

    let bytes = file.bytes.clone();
    let pages = run_pdf_task(failure, move || pdf_service::page_count(&bytes)).await?;
    let body = describe(&file.filename, pages, state.now());

    info!(filename = %file.filename, pages, content_type, "exported PDF summary");
    Ok(attachment(
        content_type,
        &renamed(&file.filename, &["pdf"], extension),
        body,
    ))
}

/// `POST /api/pdf-to-word`
pub async fn pdf_to_word(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    pdf_summary(
        state,
        multipart,
        "Failed to convert PDF to Word",
        TEXT,
        "txt",
        convert_service::pdf_to_word_text,
    )
    .await
}

/// `POST /api/pdf-to-excel`
pub async fn pdf_to_excel(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    pdf_summary(
        state,
        multipart,
        "Failed to convert PDF to Excel",
        CSV,
        "csv",
        convert_service::pdf_to_excel_csv,
    )
    .await
}

/// `POST /api/pdf-to-powerpoint`
pub async fn pdf_to_powerpoint(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    pdf_summary(
        state,
        multipart,
        "Failed to convert PDF to PowerPoint",
        TEXT,
        "txt",
        convert_service::pdf_to_powerpoint_outline,
    )
    .await
}

/// `POST /api/pdf-to-jpg`
///
/// Produces one placeholder JPEG per page and registers them in the image
/// store.
pub async fn pdf_to_jpg(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImagesResponse>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let file = form.require_file("file")?;
    file.ensure_within(MAX_PDF_TO_JPG_UPLOAD_BYTES)?;

    let stem = file
        .filename
        .rsplit_once('.')
        .filter(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
        .map_or(file.filename.as_str(), |(stem, _)| stem)
        .to_string();

    let bytes = file.bytes.clone();
    let pages = run_pdf_task("Failed to convert PDF to images", move || {
        image_service::page_placeholders(&bytes, &stem)
    })
    .await?;

    let images = state.images.put_batch(JPEG, pages);

    info!(filename = %file.filename, images = images.len(), "converted PDF to images");
    Ok(Json(ImagesResponse { images }))
}

/// `POST /api/jpg-to-pdf`
pub async fn jpg_to_pdf(multipart: Multipart) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let images: Vec<_> = form.files_named("files").map(|f| f.bytes.clone()).collect();

    if images.is_empty() {
        return Err(AppError::bad_request("No images provided"));
    }

    for image in form.files_named("files") {
        debug!(
            filename = %image.filename,
            content_type = image.content_type.as_deref().unwrap_or("unknown"),
            bytes = image.len(),
            "embedding image"
        );
    }

    let count = images.len();
    let pdf = run_pdf_task("Failed to convert images to PDF", move || {
        image_service::images_to_pdf(&images)
    })
    .await?;

    info!(images = count, bytes = pdf.len(), "converted images to PDF");
    Ok(attachment(PDF, "converted-images.pdf", pdf))
}
