//! Report - daily report extraction and ODOT form mapping
//!
//! This crate provides:
//! - Field extraction from loosely-structured daily report JSON
//! - Work date / weekday resolution with timezone handling
//! - The ODOT field-name mapping (text fields, checkboxes, weekday radios)
//! - The fill pipeline that drives `pdf-form`
//!
//! # Example
//!
//! ```ignore
//! use report::{build_field_mapping, fill_form};
//!
//! let data: serde_json::Value = serde_json::from_str(&json)?;
//! let mapping = build_field_mapping(&data);
//! let pdf_bytes = fill_form(&template_bytes, &mapping, &photos)?;
//! ```

pub mod extract;
mod fill;
mod mapping;
mod workdate;

pub use fill::{fill_form, fill_form_document, PHOTO_SLOTS};
pub use mapping::{build_field_mapping, FieldMapping, FieldValue};
pub use workdate::WorkDate;

use thiserror::Error;

/// Errors that can occur while producing a filled report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid report data: {0}")]
    DataError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_form::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
