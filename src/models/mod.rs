//! Core data models for the PDF utility service.
//!
//! `artifact` describes generated files held for a follow-up download;
//! `options` parses the string form fields each operation accepts.

pub mod artifact;
pub mod options;
