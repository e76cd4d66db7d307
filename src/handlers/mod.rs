//! Axum handlers, grouped by the family of endpoints they serve.

pub mod artifact_handlers;
pub mod convert_handlers;
pub mod form;
pub mod health_handlers;
pub mod pdf_handlers;
pub mod response;
