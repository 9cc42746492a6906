//! Document composition pipeline
//!
//! One `compose` call runs the whole sequence on a fresh copy of the
//! template: plain field fill, box grids, Arabic text, flatten, serialize.
//! Failures below the template level stay local to their field; the
//! pipeline always advances and the report says what happened to each
//! field.

use crate::boxes::{self, BORDER_WIDTH, CELL_HEIGHT, CELL_WIDTH, DIGIT_SIZE, SLASH_SIZE};
use crate::catalog::{Binding, CATALOG};
use crate::record::EmployeeRecord;
use crate::store::Resources;
use crate::{ComposeError, Result};
use pdf_form::FormDocument;
use tracing::{debug, warn};

/// Size of the outline drawn in place of Arabic text when no font loaded.
const DEGRADED_MARKER_WIDTH: f32 = 200.0;
const DEGRADED_MARKER_HEIGHT: f32 = 20.0;

/// What happened to one catalog field during composition.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Plain field filled through the form.
    Filled,
    /// Box grid drawn; `truncated` marks input cut to fit the grid.
    BoxRendered { truncated: bool },
    /// Arabic text shaped and drawn on this many pages.
    ArabicDrawn { pages: usize },
    /// No font; a visible marker rectangle substitutes for the text.
    Degraded,
    /// The record had no value for this field.
    SkippedEmpty,
    /// The template does not declare the field.
    MissingField,
    /// Field-local failure; siblings still rendered.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FieldReport {
    pub field: &'static str,
    pub outcome: FieldOutcome,
}

/// A finished document plus the per-field outcome report.
pub struct Composition {
    pub bytes: Vec<u8>,
    pub report: Vec<FieldReport>,
}

impl Composition {
    pub fn outcome(&self, field: &str) -> Option<&FieldOutcome> {
        self.report
            .iter()
            .find(|r| r.field == field)
            .map(|r| &r.outcome)
    }
}

/// The composition engine. Cheap to construct; holds only a reference to
/// the shared resources, so one can be built per request.
pub struct Composer<'a> {
    resources: &'a Resources,
}

impl<'a> Composer<'a> {
    pub fn new(resources: &'a Resources) -> Self {
        Self { resources }
    }

    /// Compose one record into flattened document bytes.
    ///
    /// The only failure is an unusable template; everything below that
    /// degrades per field and is recorded in the report.
    pub fn compose(&self, record: &EmployeeRecord) -> Result<Composition> {
        let mut doc = FormDocument::from_bytes(&self.resources.template)
            .map_err(|e| ComposeError::TemplateUnavailable(e.to_string()))?;
        if let Some(font) = &self.resources.font {
            doc.register_unicode_font(font.clone());
        }

        let mut report = Vec::with_capacity(CATALOG.len());
        let page_count = doc.page_count();

        for entry in CATALOG {
            let outcome = match entry.binding {
                Binding::Text => self.fill_text(&mut doc, entry.name, record),
                Binding::BoxRun { x, y } => {
                    self.draw_box(&mut doc, entry.name, record, |v| {
                        Some(boxes::plan_run(v, x, y))
                    })
                }
                Binding::BoxFixed7 { x, y } => {
                    self.draw_box(&mut doc, entry.name, record, |v| {
                        Some(boxes::plan_fixed7(v, x, y))
                    })
                }
                Binding::BoxSlashPair { x, y } => {
                    self.draw_box(&mut doc, entry.name, record, |v| {
                        Some(boxes::plan_slash_pair(v, x, y))
                    })
                }
                Binding::BoxDate { x, y } => {
                    self.draw_box(&mut doc, entry.name, record, |v| boxes::plan_date(v, x, y))
                }
                Binding::Arabic {
                    x,
                    y,
                    size,
                    duplicate_on_page_two,
                } => {
                    let pages = if duplicate_on_page_two && page_count >= 2 {
                        2
                    } else {
                        1
                    };
                    self.draw_arabic(&mut doc, entry.name, record, x, y, size, pages)
                }
            };

            if let FieldOutcome::Failed(reason) = &outcome {
                warn!(field = entry.name, reason = %reason, "field rendering failed");
            }
            report.push(FieldReport {
                field: entry.name,
                outcome,
            });
        }

        doc.flatten()?;
        let bytes = doc.to_bytes()?;
        debug!(bytes = bytes.len(), "composition finished");

        Ok(Composition { bytes, report })
    }

    fn fill_text(
        &self,
        doc: &mut FormDocument,
        name: &'static str,
        record: &EmployeeRecord,
    ) -> FieldOutcome {
        let value = match record.value(name) {
            Some(v) => v,
            None => return FieldOutcome::SkippedEmpty,
        };
        match doc.set_field(name, value) {
            Ok(true) => FieldOutcome::Filled,
            Ok(false) => {
                debug!(field = name, "field not declared by template");
                FieldOutcome::MissingField
            }
            Err(e) => FieldOutcome::Failed(e.to_string()),
        }
    }

    fn draw_box<F>(
        &self,
        doc: &mut FormDocument,
        name: &'static str,
        record: &EmployeeRecord,
        plan_fn: F,
    ) -> FieldOutcome
    where
        F: FnOnce(&str) -> Option<boxes::LayoutPlan>,
    {
        let value = match record.value(name) {
            Some(v) => v,
            None => return FieldOutcome::SkippedEmpty,
        };
        let plan = match plan_fn(value) {
            Some(plan) if !plan.is_empty() => plan,
            Some(_) => return FieldOutcome::SkippedEmpty,
            None => return FieldOutcome::Failed(format!("malformed value {value:?}")),
        };
        if plan.truncated {
            warn!(field = name, value, "input wider than grid, truncated");
        }

        match paint_plan(doc, &plan) {
            Ok(()) => FieldOutcome::BoxRendered {
                truncated: plan.truncated,
            },
            Err(e) => FieldOutcome::Failed(e.to_string()),
        }
    }

    fn draw_arabic(
        &self,
        doc: &mut FormDocument,
        name: &'static str,
        record: &EmployeeRecord,
        x: f32,
        y: f32,
        size: f32,
        pages: usize,
    ) -> FieldOutcome {
        let value = match record.value(name) {
            Some(v) => v,
            None => return FieldOutcome::SkippedEmpty,
        };

        if !doc.has_unicode_font() {
            // keep the defect visible rather than silently blank
            for page in 1..=pages {
                if let Err(e) =
                    doc.draw_marker_rect(page, x, y, DEGRADED_MARKER_WIDTH, DEGRADED_MARKER_HEIGHT)
                {
                    return FieldOutcome::Failed(e.to_string());
                }
            }
            return FieldOutcome::Degraded;
        }

        let visual = arabic_text::render_visual(value);
        for page in 1..=pages {
            if let Err(e) = doc.draw_unicode_text(page, &visual, x, y, size) {
                return FieldOutcome::Failed(e.to_string());
            }
        }
        FieldOutcome::ArabicDrawn { pages }
    }
}

/// Paint a layout plan onto page 1: every cell bordered, glyphs centered,
/// slashes between groups.
fn paint_plan(doc: &mut FormDocument, plan: &boxes::LayoutPlan) -> pdf_form::Result<()> {
    for cell in &plan.cells {
        doc.draw_cell(1, cell.x, cell.y, CELL_WIDTH, CELL_HEIGHT, BORDER_WIDTH)?;
        if let Some((gx, gy, glyph)) = boxes::glyph_origin(cell) {
            doc.draw_base_text(1, &glyph.to_string(), gx, gy, DIGIT_SIZE)?;
        }
    }
    for slash in &plan.slashes {
        doc.draw_base_text(1, "/", slash.x, slash.y, SLASH_SIZE)?;
    }
    Ok(())
}
