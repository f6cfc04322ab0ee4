//! PDF Form - AcroForm filling and image embedding
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Setting text, checkbox and radio-button field values on widget
//!   annotations
//! - Inserting images (JPEG, PNG, or anything the `image` crate decodes)
//!
//! # Example
//!
//! ```ignore
//! use pdf_form::FormDocument;
//!
//! let mut doc = FormDocument::open("template.pdf")?;
//! doc.set_text("form1[0].Page1[0].Name[0]", "Jane Doe")?;
//! doc.set_check("form1[0].Page1[0].Approved[0]", true)?;
//! doc.save("output.pdf")?;
//! ```

mod document;
mod fields;
mod image;

pub use document::FormDocument;
pub use fields::{FieldKind, Widget};
pub use image::{calculate_scaled_dimensions, ImageScaleMode, ImageXObject};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
