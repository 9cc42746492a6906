//! PDF Form - AcroForm template manipulation
//!
//! This crate provides the narrow set of PDF operations the insurance
//! composer needs:
//! - Opening a form template from bytes
//! - Enumerating and setting AcroForm field values
//! - Drawing bordered cells and text at absolute coordinates
//! - Embedding a Unicode (Identity-H) TrueType font
//! - Flattening the form and serializing to bytes
//!
//! # Example
//!
//! ```ignore
//! use pdf_form::FormDocument;
//!
//! let mut doc = FormDocument::from_bytes(&template)?;
//! doc.set_field("Title", "Engineer")?;
//! doc.draw_cell(1, 275.0, 550.0, 16.5, 21.0, 0.6)?;
//! doc.draw_base_text(1, "7", 280.0, 555.0, 12.0)?;
//! doc.flatten()?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod ops;

pub use document::FormDocument;
pub use font::UnicodeFont;
pub use ops::{base_text_width, cell_operators, literal_text_operators, shaped_text_operators};

use thiserror::Error;

/// Errors that can occur during form operations
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Failed to open template: {0}")]
    OpenError(String),

    #[error("Failed to save document: {0}")]
    SaveError(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("No Unicode font registered")]
    FontNotRegistered,

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF structure error: {0}")]
    StructureError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;
