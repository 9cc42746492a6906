//! Process-wide template and font resources
//!
//! The template and the Arabic font are loaded once at startup and shared
//! read-only by every composition. A missing template is fatal; no usable
//! font is a degraded state the composer works around.

use crate::catalog::{self, CatalogDiagnostics};
use crate::{ComposeError, Result};
use pdf_form::{FormDocument, UnicodeFont};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Fixed template location relative to the working directory.
pub const TEMPLATE_PATH: &str = "resources/insurance_form.pdf";

/// Candidate Arabic font files, in preference order. The first one that
/// parses wins; the rest are not tried.
pub const FONT_CANDIDATES: &[&str] = &[
    "resources/fonts/TraditionalArabic.ttf",
    "resources/fonts/NotoNaskhArabic-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoNaskhArabic-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

// The load outcome is cached either way: a missing template at startup is
// the terminal condition, not something to retry per request.
static STORE: OnceLock<std::result::Result<Resources, String>> = OnceLock::new();

/// Immutable resources shared by all compositions.
pub struct Resources {
    pub template: Vec<u8>,
    pub font: Option<UnicodeFont>,
    /// Catalog-vs-template check result from load time.
    pub diagnostics: CatalogDiagnostics,
}

impl Resources {
    /// The process-wide resource store, loading it on first access.
    ///
    /// The load itself runs at most once: `get_or_init` blocks concurrent
    /// first callers until one of them has finished it, and every caller
    /// then sees the same instance.
    pub fn global() -> Result<&'static Resources> {
        let store = STORE.get_or_init(|| Self::load().map_err(|e| e.to_string()));
        store
            .as_ref()
            .map_err(|e| ComposeError::TemplateUnavailable(e.clone()))
    }

    /// Load from the fixed paths. Missing template is the one fatal case.
    pub fn load() -> Result<Resources> {
        let template = std::fs::read(TEMPLATE_PATH)
            .map_err(|e| ComposeError::TemplateUnavailable(format!("{TEMPLATE_PATH}: {e}")))?;
        let font = load_first_font(FONT_CANDIDATES);
        Self::from_parts(template, font)
    }

    /// Build a store from already-loaded parts, validating the catalog
    /// against the template's declared fields.
    pub fn from_parts(template: Vec<u8>, font: Option<UnicodeFont>) -> Result<Resources> {
        let doc = FormDocument::from_bytes(&template)
            .map_err(|e| ComposeError::TemplateUnavailable(e.to_string()))?;

        let diagnostics = catalog::validate(&doc.field_names());
        if !diagnostics.is_clean() {
            warn!(
                missing = ?diagnostics.missing_in_template,
                unbound = ?diagnostics.unbound_in_template,
                "catalog does not match template fields"
            );
        }
        info!(
            pages = doc.page_count(),
            has_font = font.is_some(),
            "resources loaded"
        );

        Ok(Resources {
            template,
            font,
            diagnostics,
        })
    }
}

/// Try each candidate in order; first successful parse wins. All failing
/// is non-fatal: Arabic output degrades but composition still runs.
fn load_first_font(candidates: &[&str]) -> Option<UnicodeFont> {
    for path in candidates {
        if !Path::new(path).exists() {
            debug!(path, "font candidate absent");
            continue;
        }
        match std::fs::read(path) {
            Ok(bytes) => match UnicodeFont::from_ttf(font_name(path), &bytes) {
                Ok(font) => {
                    info!(path, "arabic font loaded");
                    return Some(font);
                }
                Err(e) => warn!(path, error = %e, "font candidate failed to parse"),
            },
            Err(e) => warn!(path, error = %e, "font candidate unreadable"),
        }
    }
    warn!("no arabic font available; arabic fields will render degraded");
    None
}

fn font_name(path: &str) -> &str {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("ArabicFont")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_font_name_from_path() {
        assert_eq!(
            font_name("resources/fonts/NotoNaskhArabic-Regular.ttf"),
            "NotoNaskhArabic-Regular"
        );
        assert_eq!(font_name("trado.ttf"), "trado");
    }

    #[test]
    fn test_load_first_font_all_absent() {
        let font = load_first_font(&["/nonexistent/a.ttf", "/nonexistent/b.ttf"]);
        assert!(font.is_none());
    }

    #[test]
    fn test_global_caches_one_load_outcome() {
        // No template resource exists in the test environment, so every
        // caller, concurrent or sequential, sees the same cached failure.
        let threads: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| Resources::global().is_err()))
            .collect();
        for handle in threads {
            assert!(handle.join().unwrap());
        }
        assert!(matches!(
            Resources::global(),
            Err(ComposeError::TemplateUnavailable(_))
        ));
    }

    #[test]
    fn test_from_parts_rejects_garbage_template() {
        let result = Resources::from_parts(b"not a pdf".to_vec(), None);
        assert!(matches!(
            result,
            Err(ComposeError::TemplateUnavailable(_))
        ));
    }
}
