//! Form document wrapper
//!
//! Wraps a `lopdf::Document` opened from template bytes. Drawing calls are
//! buffered per page and flushed once at save time; AcroForm field values
//! are written directly into the field dictionaries and painted into the
//! page content when the form is flattened.
//!
//! All drawing coordinates are PDF user-space (bottom-left origin). The
//! template's box grid was designed against those coordinates, so no
//! top-origin conversion is applied anywhere in this crate.

use crate::font::UnicodeFont;
use crate::ops::{cell_operators, literal_text_operators, shaped_text_operators};
use crate::{FormError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Resource name for the non-embedded Helvetica-Bold used for digits,
/// slashes, and flattened field values.
const BASE_FONT_RESOURCE: &str = "Fhb";

/// Resource name for the embedded Identity-H Unicode font.
const UNICODE_FONT_RESOURCE: &str = "Funi";

/// Font size used when painting flattened field values.
const FLATTEN_FONT_SIZE: f32 = 11.0;

/// A writable copy of the form template.
pub struct FormDocument {
    inner: Document,
    /// Registered Unicode font (Arabic face), if any
    unicode_font: Option<UnicodeFont>,
    /// Buffered content operators per page, flushed at save
    page_content_buffer: HashMap<usize, Vec<u8>>,
    /// Pages that reference the base font resource
    pages_using_base_font: HashSet<usize>,
    /// Pages that reference the Unicode font resource
    pages_using_unicode_font: HashSet<usize>,
}

impl FormDocument {
    /// Open a template from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| FormError::OpenError(e.to_string()))?;

        Ok(Self {
            inner,
            unicode_font: None,
            page_content_buffer: HashMap::new(),
            pages_using_base_font: HashSet::new(),
            pages_using_unicode_font: HashSet::new(),
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Register the embedded Unicode font used by `draw_unicode_text`.
    pub fn register_unicode_font(&mut self, font: UnicodeFont) {
        self.unicode_font = Some(font);
    }

    /// Whether a Unicode font has been registered.
    pub fn has_unicode_font(&self) -> bool {
        self.unicode_font.is_some()
    }

    /// Names of all AcroForm fields declared by the template.
    pub fn field_names(&self) -> Vec<String> {
        self.collect_field_ids()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// Set an AcroForm field value.
    ///
    /// Returns `Ok(true)` when the field exists and was set, `Ok(false)`
    /// when the template declares no such field. Missing fields are a
    /// normal condition for the caller, never an error.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<bool> {
        let field_id = self
            .collect_field_ids()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| id);

        let Some(id) = field_id else {
            return Ok(false);
        };

        let obj = self.inner.get_object_mut(id)?;
        let dict = obj
            .as_dict_mut()
            .map_err(|_| FormError::StructureError("field object is not a dictionary".into()))?;
        dict.set("V", Object::string_literal(value));
        // Stale appearance streams would shadow the value we paint at
        // flatten time.
        dict.remove(b"AP");

        debug!(field = name, "set form field");
        Ok(true)
    }

    /// Draw one bordered grid cell at absolute coordinates.
    pub fn draw_cell(
        &mut self,
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
    ) -> Result<()> {
        self.check_page(page)?;
        let ops = cell_operators(x, y, width, height, line_width);
        self.buffer_content(page, &ops);
        Ok(())
    }

    /// Draw an outlined rectangle (no fill); used as the visible marker for
    /// degraded text regions.
    pub fn draw_marker_rect(
        &mut self,
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        self.check_page(page)?;
        let ops = format!("q\n1 0 0 RG\n1 w\n{x} {y} {width} {height} re S\nQ\n");
        self.buffer_content(page, ops.as_bytes());
        Ok(())
    }

    /// Draw text in the non-embedded base font (WinAnsi Helvetica-Bold).
    pub fn draw_base_text(
        &mut self,
        page: usize,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
    ) -> Result<()> {
        self.check_page(page)?;
        if text.is_empty() {
            return Ok(());
        }
        let ops = literal_text_operators(text, x, y, BASE_FONT_RESOURCE, font_size);
        self.buffer_content(page, &ops);
        self.pages_using_base_font.insert(page);
        Ok(())
    }

    /// Draw text in the registered Unicode font.
    ///
    /// The text must already be in visual order; this draws glyphs
    /// left-to-right from `x`.
    pub fn draw_unicode_text(
        &mut self,
        page: usize,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
    ) -> Result<()> {
        self.check_page(page)?;
        if text.is_empty() {
            return Ok(());
        }

        let font = self
            .unicode_font
            .as_mut()
            .ok_or(FormError::FontNotRegistered)?;
        font.mark_used(text);
        let hex = font.encode_text_hex(text);

        let ops = shaped_text_operators(&hex, x, y, UNICODE_FONT_RESOURCE, font_size);
        self.buffer_content(page, &ops);
        self.pages_using_unicode_font.insert(page);
        Ok(())
    }

    /// Flatten the form: paint every filled field value into its page at
    /// the widget rectangle, then drop widget annotations and the AcroForm
    /// dictionary. The result carries no editable state.
    pub fn flatten(&mut self) -> Result<()> {
        let pages = self.inner.get_pages();
        let page_ids: Vec<(usize, ObjectId)> = pages
            .iter()
            .map(|(&num, &id)| (num as usize, id))
            .collect();

        for (page_num, page_id) in page_ids {
            let widgets = self.page_widgets(page_id);

            for widget in &widgets {
                if let Some((value, rect)) = widget_value_and_rect(&self.inner, *widget) {
                    if value.is_empty() {
                        continue;
                    }
                    let x = rect[0] + 2.0;
                    let y = rect[1] + (rect[3] - rect[1] - FLATTEN_FONT_SIZE) / 2.0 + 2.0;
                    let ops =
                        literal_text_operators(&value, x, y, BASE_FONT_RESOURCE, FLATTEN_FONT_SIZE);
                    self.buffer_content(page_num, &ops);
                    self.pages_using_base_font.insert(page_num);
                }
            }

            self.remove_widget_annotations(page_id)?;
        }

        self.remove_acroform()?;
        debug!("form flattened");
        Ok(())
    }

    /// Serialize the document: embed fonts, flush buffered content, save.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.embed_fonts()?;
        self.flush_content_buffers()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| FormError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    fn check_page(&self, page: usize) -> Result<()> {
        let count = self.page_count();
        if page == 0 || page > count {
            return Err(FormError::InvalidPage(page, count));
        }
        Ok(())
    }

    // ---- AcroForm walking -------------------------------------------------

    /// Collect (name, object id) for every named field reachable from the
    /// AcroForm /Fields array, following /Kids one tree deep per level.
    fn collect_field_ids(&self) -> Vec<(String, ObjectId)> {
        let mut out = Vec::new();

        let Some(acroform) = self.acroform_dict() else {
            return out;
        };
        let Ok(fields) = acroform.get(b"Fields").and_then(|f| f.as_array()) else {
            return out;
        };

        for entry in fields {
            if let Ok(id) = entry.as_reference() {
                self.visit_field(id, &mut out, 0);
            }
        }
        out
    }

    fn visit_field(&self, id: ObjectId, out: &mut Vec<(String, ObjectId)>, depth: usize) {
        if depth > 4 {
            return;
        }
        let Ok(obj) = self.inner.get_object(id) else {
            return;
        };
        let Ok(dict) = obj.as_dict() else {
            return;
        };

        if let Ok(name) = dict.get(b"T").and_then(|t| t.as_str()) {
            out.push((String::from_utf8_lossy(name).into_owned(), id));
        }

        if let Ok(kids) = dict.get(b"Kids").and_then(|k| k.as_array()) {
            for kid in kids {
                if let Ok(kid_id) = kid.as_reference() {
                    self.visit_field(kid_id, out, depth + 1);
                }
            }
        }
    }

    fn acroform_dict(&self) -> Option<&Dictionary> {
        let root_id = self.inner.trailer.get(b"Root").ok()?.as_reference().ok()?;
        let catalog = self.inner.get_object(root_id).ok()?.as_dict().ok()?;
        match catalog.get(b"AcroForm").ok()? {
            Object::Dictionary(dict) => Some(dict),
            Object::Reference(id) => self.inner.get_object(*id).ok()?.as_dict().ok(),
            _ => None,
        }
    }

    fn remove_acroform(&mut self) -> Result<()> {
        let root_id = self
            .inner
            .trailer
            .get(b"Root")
            .and_then(|r| r.as_reference())
            .map_err(|_| FormError::StructureError("trailer has no Root reference".into()))?;

        if let Ok(Object::Dictionary(catalog)) = self.inner.get_object_mut(root_id) {
            catalog.remove(b"AcroForm");
        }
        Ok(())
    }

    /// Widget annotation object ids on a page.
    fn page_widgets(&self, page_id: ObjectId) -> Vec<ObjectId> {
        let mut widgets = Vec::new();
        let Ok(page_dict) = self.inner.get_object(page_id).and_then(|o| o.as_dict()) else {
            return widgets;
        };
        let Some(annots) = self.resolve_array(page_dict.get(b"Annots").ok()) else {
            return widgets;
        };

        for annot in annots {
            let Ok(id) = annot.as_reference() else {
                continue;
            };
            if let Ok(dict) = self.inner.get_object(id).and_then(|o| o.as_dict()) {
                if is_widget(dict) {
                    widgets.push(id);
                }
            }
        }
        widgets
    }

    /// Drop widget annotations from a page, keeping any other annotation
    /// kinds intact.
    fn remove_widget_annotations(&mut self, page_id: ObjectId) -> Result<()> {
        let kept: Option<Vec<Object>> = {
            let Ok(page_dict) = self.inner.get_object(page_id).and_then(|o| o.as_dict()) else {
                return Ok(());
            };
            self.resolve_array(page_dict.get(b"Annots").ok()).map(|annots| {
                annots
                    .iter()
                    .filter(|annot| {
                        let Ok(id) = annot.as_reference() else {
                            return true;
                        };
                        match self.inner.get_object(id).and_then(|o| o.as_dict()) {
                            Ok(dict) => !is_widget(dict),
                            Err(_) => true,
                        }
                    })
                    .cloned()
                    .collect()
            })
        };

        let Some(kept) = kept else {
            return Ok(());
        };

        if let Ok(Object::Dictionary(page_dict)) = self.inner.get_object_mut(page_id) {
            if kept.is_empty() {
                page_dict.remove(b"Annots");
            } else {
                page_dict.set("Annots", Object::Array(kept));
            }
        }
        Ok(())
    }

    /// Resolve an object that may be an inline array or a reference to one.
    fn resolve_array(&self, obj: Option<&Object>) -> Option<Vec<Object>> {
        match obj? {
            Object::Array(arr) => Some(arr.clone()),
            Object::Reference(id) => match self.inner.get_object(*id).ok()? {
                Object::Array(arr) => Some(arr.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    // ---- Content buffering ------------------------------------------------

    /// Buffer content operators for a page; flushed once at save so each
    /// composition appends a single stream per page.
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();
        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }
        Ok(())
    }

    /// Append operators to a page's content, preserving what the template
    /// already draws. Handles single streams, referenced streams, and
    /// stream arrays; compressed streams are inflated first.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let pages = self.inner.get_pages();
        let page_id = *pages
            .get(&(page as u32))
            .ok_or(FormError::InvalidPage(page, pages.len()))?;

        let (existing, page_dict) = {
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| FormError::StructureError("page object is not a dictionary".into()))?
                .clone();

            let existing = match page_dict.get(b"Contents") {
                Ok(Object::Stream(stream)) => stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone()),
                Ok(Object::Reference(id)) => match self.inner.get_object(*id) {
                    Ok(Object::Stream(stream)) => stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone()),
                    _ => Vec::new(),
                },
                Ok(Object::Array(arr)) => {
                    let mut combined = Vec::new();
                    for entry in arr {
                        let stream = match entry {
                            Object::Reference(id) => match self.inner.get_object(*id) {
                                Ok(Object::Stream(stream)) => Some(stream),
                                _ => None,
                            },
                            Object::Stream(stream) => Some(stream),
                            _ => None,
                        };
                        if let Some(stream) = stream {
                            combined.extend_from_slice(
                                &stream
                                    .decompressed_content()
                                    .unwrap_or_else(|_| stream.content.clone()),
                            );
                        }
                    }
                    combined
                }
                _ => Vec::new(),
            };

            (existing, page_dict)
        };

        let mut new_content = existing;
        // Operator boundary guard: the template's stream may not end in
        // whitespace.
        new_content.push(b'\n');
        new_content.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), new_content));

        let mut new_page_dict = page_dict;
        new_page_dict.set("Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    // ---- Font embedding ---------------------------------------------------

    /// Embed the fonts used by buffered content and reference them from the
    /// pages that need them.
    fn embed_fonts(&mut self) -> Result<()> {
        if !self.pages_using_base_font.is_empty() {
            let base_font_id = self.add_base_font_object();
            let pages: Vec<usize> = self.pages_using_base_font.iter().copied().collect();
            for page in pages {
                self.add_font_to_page_resources(page, BASE_FONT_RESOURCE, base_font_id)?;
            }
        }

        if !self.pages_using_unicode_font.is_empty() {
            let font = match &self.unicode_font {
                Some(font) => font,
                None => {
                    warn!("unicode text was drawn but no font is registered");
                    return Ok(());
                }
            };
            let type0_id = Self::embed_unicode_font(&mut self.inner, font);
            let pages: Vec<usize> = self.pages_using_unicode_font.iter().copied().collect();
            for page in pages {
                self.add_font_to_page_resources(page, UNICODE_FONT_RESOURCE, type0_id)?;
            }
        }

        Ok(())
    }

    /// Non-embedded standard-14 Helvetica-Bold with WinAnsi encoding.
    fn add_base_font_object(&mut self) -> ObjectId {
        let dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica-Bold".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]);
        self.inner.add_object(dict)
    }

    /// Wire up the Type0 / CIDFontType2 / descriptor / font file / ToUnicode
    /// object graph and return the Type0 font id.
    fn embed_unicode_font(doc: &mut Document, font: &UnicodeFont) -> ObjectId {
        let objects = font.to_pdf_objects();

        let font_file_id = doc.add_object(objects.font_file_stream);

        let mut descriptor = objects.font_descriptor;
        descriptor.set("FontFile2", Object::Reference(font_file_id));
        let descriptor_id = doc.add_object(descriptor);

        let mut cid_font = objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
        let cid_font_id = doc.add_object(cid_font);

        let tounicode_id = doc.add_object(objects.tounicode_stream);

        let mut type0 = objects.type0_font;
        type0.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );
        type0.set("ToUnicode", Object::Reference(tounicode_id));
        doc.add_object(type0)
    }

    /// Add a font reference to a page's Resources/Font dictionary,
    /// preserving whatever resources the template already declares
    /// (resolving a referenced Resources dictionary into the page first).
    fn add_font_to_page_resources(
        &mut self,
        page: usize,
        resource_name: &str,
        font_id: ObjectId,
    ) -> Result<()> {
        let pages = self.inner.get_pages();
        let page_id = *pages
            .get(&(page as u32))
            .ok_or(FormError::InvalidPage(page, pages.len()))?;

        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| FormError::StructureError("page object is not a dictionary".into()))?
            .clone();

        let mut resources = match page_dict.get(b"Resources") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => match self.inner.get_object(*id) {
                Ok(Object::Dictionary(dict)) => dict.clone(),
                _ => Dictionary::new(),
            },
            _ => Dictionary::new(),
        };

        let mut font_dict = match resources.get(b"Font") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => match self.inner.get_object(*id) {
                Ok(Object::Dictionary(dict)) => dict.clone(),
                _ => Dictionary::new(),
            },
            _ => Dictionary::new(),
        };

        font_dict.set(resource_name.as_bytes(), Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(font_dict));

        let mut new_page_dict = page_dict;
        new_page_dict.set("Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }
}

fn is_widget(dict: &Dictionary) -> bool {
    dict.get(b"Subtype")
        .and_then(|s| s.as_name())
        .map(|name| name == b"Widget")
        .unwrap_or(false)
}

/// Read a widget's inherited field value and its /Rect, walking /Parent for
/// merged field/widget splits.
fn widget_value_and_rect(doc: &Document, widget_id: ObjectId) -> Option<(String, [f32; 4])> {
    let dict = doc.get_object(widget_id).ok()?.as_dict().ok()?;

    let rect = dict.get(b"Rect").ok()?.as_array().ok()?;
    if rect.len() != 4 {
        return None;
    }
    let mut r = [0.0f32; 4];
    for (i, obj) in rect.iter().enumerate() {
        r[i] = number_as_f32(obj)?;
    }

    let value = inherited_value(doc, dict, 0)?;
    Some((value, r))
}

fn inherited_value(doc: &Document, dict: &Dictionary, depth: usize) -> Option<String> {
    if depth > 4 {
        return None;
    }
    if let Ok(v) = dict.get(b"V") {
        if let Ok(bytes) = v.as_str() {
            return Some(String::from_utf8_lossy(bytes).into_owned());
        }
    }
    let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    let parent = doc.get_object(parent_id).ok()?.as_dict().ok()?;
    inherited_value(doc, parent, depth + 1)
}

fn number_as_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
