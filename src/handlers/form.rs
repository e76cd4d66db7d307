//! Buffered multipart form extraction.
//!
//! Every operation needs its whole upload in memory before the PDF library
//! can parse it, so the form is drained up front into files and text fields.

use crate::errors::AppError;
use axum::extract::Multipart;
use bytes::Bytes;
use std::collections::HashMap;
use tracing::warn;

/// One uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file arrived under.
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reject files larger than `max_bytes`.
    pub fn ensure_within(&self, max_bytes: usize) -> Result<(), AppError> {
        if self.len() > max_bytes {
            warn!(
                filename = %self.filename,
                bytes = self.len(),
                max_bytes,
                "rejected oversized upload"
            );
            return Err(AppError::bad_request(format!(
                "File too large. Maximum size is {}MB.",
                max_bytes / (1024 * 1024)
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drain `multipart`. Parts with a filename are files, the rest are text
    /// fields; a repeated text field keeps its last value.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    // Browsers send an empty, unnamed part for an untouched file input.
                    if filename.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.push(UploadedFile {
                        field: name,
                        filename,
                        content_type,
                        bytes,
                    });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// First file sent under `field`.
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }

    /// Like [`file`](Self::file), but a missing file is a 400.
    pub fn require_file(&self, field: &str) -> Result<&UploadedFile, AppError> {
        self.file(field)
            .ok_or_else(|| AppError::bad_request("No file provided"))
    }

    /// Every file sent under exactly `field`, in upload order.
    pub fn files_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadedFile> {
        self.files.iter().filter(move |f| f.field == field)
    }

    /// Every file whose field name starts with `prefix`, in upload order.
    pub fn files_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a UploadedFile> {
        self.files.iter().filter(move |f| f.field.starts_with(prefix))
    }

    /// Text field value, trimmed. Blank values count as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Text field value exactly as sent. Only an empty value counts as absent.
    pub fn raw_text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Like [`text`](Self::text), but a missing value is a 400 with `message`.
    pub fn require_text(&self, key: &str, message: &str) -> Result<&str, AppError> {
        self.text(key).ok_or_else(|| AppError::bad_request(message))
    }
}
