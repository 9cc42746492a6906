//! Form Composer - bilingual employee form composition
//!
//! This crate turns one employee record into a flattened, non-editable
//! PDF built on a fixed AcroForm template:
//! - Plain fields filled by name, honoring the box-rendered skip set
//! - Numeric and date fields drawn into pre-printed box grids
//! - Arabic strings shaped, reordered, and drawn at fixed positions
//! - Per-field outcome report instead of silent partial failure
//!
//! # Example
//!
//! ```ignore
//! use form_composer::{Composer, EmployeeRecord, Resources};
//!
//! let resources = Resources::global()?;
//! let record: EmployeeRecord = serde_json::from_str(input)?;
//! let composition = Composer::new(resources).compose(&record)?;
//! std::fs::write("out.pdf", composition.bytes)?;
//! ```

pub mod boxes;
pub mod catalog;
mod compose;
mod record;
mod store;

pub use catalog::{Binding, CatalogDiagnostics, FieldBinding, CATALOG};
pub use compose::{Composer, Composition, FieldOutcome, FieldReport};
pub use record::EmployeeRecord;
pub use store::{Resources, FONT_CANDIDATES, TEMPLATE_PATH};

use thiserror::Error;

/// Errors that can abort a composition
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The one fatal condition: no usable template, no document.
    #[error("Template unavailable: {0}")]
    TemplateUnavailable(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_form::FormError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for composition operations
pub type Result<T> = std::result::Result<T, ComposeError>;
