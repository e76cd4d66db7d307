//! Document processing and artifact storage. Nothing in here knows about HTTP.

pub mod artifact_store;
pub mod convert_service;
pub mod document_builder;
pub mod image_service;
pub mod pdf_service;
