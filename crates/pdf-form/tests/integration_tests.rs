//! Integration tests exercising field filling and flattening against a
//! synthetic AcroForm template built in memory.

use lopdf::{Dictionary, Document, Object, Stream};
use pdf_form::FormDocument;
use pretty_assertions::assert_eq;

/// Build a one-page PDF with named text fields as merged field/widget
/// annotations, the way flat form templates declare them.
fn build_form_template(field_names: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let page_tree_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

    let mut field_ids = Vec::new();
    for (i, name) in field_names.iter().enumerate() {
        let y = 700 - (i as i64) * 30;
        let field_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Annot".to_vec())),
            ("Subtype", Object::Name(b"Widget".to_vec())),
            ("FT", Object::Name(b"Tx".to_vec())),
            ("T", Object::string_literal(*name)),
            (
                "Rect",
                Object::Array(vec![
                    100.into(),
                    y.into(),
                    300.into(),
                    (y + 20).into(),
                ]),
            ),
        ]));
        field_ids.push(field_id);
    }

    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(page_tree_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Dictionary(Dictionary::new())),
        (
            "MediaBox",
            Object::Array(vec![0.into(), 0.into(), 595.into(), 842.into()]),
        ),
        (
            "Annots",
            Object::Array(field_ids.iter().map(|&id| Object::Reference(id)).collect()),
        ),
    ]));

    let page_tree = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects
        .insert(page_tree_id, Object::Dictionary(page_tree));

    let acroform_id = doc.add_object(Dictionary::from_iter(vec![(
        "Fields",
        Object::Array(field_ids.iter().map(|&id| Object::Reference(id)).collect()),
    )]));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(page_tree_id)),
        ("AcroForm", Object::Reference(acroform_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn enumerates_declared_fields() {
    let template = build_form_template(&["Title", "address", "endDate"]);
    let doc = FormDocument::from_bytes(&template).unwrap();

    let mut names = doc.field_names();
    names.sort();
    assert_eq!(names, vec!["Title", "address", "endDate"]);
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn set_field_reports_missing_fields() {
    let template = build_form_template(&["Title"]);
    let mut doc = FormDocument::from_bytes(&template).unwrap();

    assert!(doc.set_field("Title", "Engineer").unwrap());
    assert!(!doc.set_field("noSuchField", "value").unwrap());
}

#[test]
fn flatten_paints_values_and_strips_form() {
    let template = build_form_template(&["Title", "address"]);
    let mut doc = FormDocument::from_bytes(&template).unwrap();

    doc.set_field("Title", "Engineer").unwrap();
    doc.flatten().unwrap();
    let bytes = doc.to_bytes().unwrap();

    let reloaded = Document::load_mem(&bytes).unwrap();

    // No editable state remains.
    let root_id = reloaded.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = reloaded.get_object(root_id).unwrap().as_dict().unwrap();
    assert!(catalog.get(b"AcroForm").is_err());

    let pages = reloaded.get_pages();
    let page_id = *pages.get(&1).unwrap();
    let page = reloaded.get_object(page_id).unwrap().as_dict().unwrap();
    assert!(page.get(b"Annots").is_err());

    // The value was painted into the page content.
    let content = reloaded.get_page_content(page_id).unwrap();
    let content = String::from_utf8_lossy(&content);
    assert!(content.contains("(Engineer) Tj"));
}

#[test]
fn drawn_cells_survive_save() {
    let template = build_form_template(&["Title"]);
    let mut doc = FormDocument::from_bytes(&template).unwrap();

    doc.draw_cell(1, 275.0, 550.0, 16.5, 21.0, 0.6).unwrap();
    doc.draw_base_text(1, "7", 280.0, 555.0, 12.0).unwrap();
    let bytes = doc.to_bytes().unwrap();

    let reloaded = Document::load_mem(&bytes).unwrap();
    let pages = reloaded.get_pages();
    let page_id = *pages.get(&1).unwrap();
    let content = reloaded.get_page_content(page_id).unwrap();
    let content = String::from_utf8_lossy(&content);

    assert!(content.contains("275 550 16.5 21 re f"));
    assert!(content.contains("275 550 16.5 21 re S"));
    assert!(content.contains("(7) Tj"));
    // The template's own content stream is preserved.
    assert!(content.contains("q Q"));
}

#[test]
fn draw_rejects_out_of_range_page() {
    let template = build_form_template(&["Title"]);
    let mut doc = FormDocument::from_bytes(&template).unwrap();

    assert!(doc.draw_cell(2, 0.0, 0.0, 10.0, 10.0, 0.5).is_err());
    assert!(doc.draw_base_text(0, "x", 0.0, 0.0, 12.0).is_err());
}

#[test]
fn unicode_text_requires_registered_font() {
    let template = build_form_template(&["Title"]);
    let mut doc = FormDocument::from_bytes(&template).unwrap();

    let err = doc.draw_unicode_text(1, "شركة", 480.0, 650.0, 14.0);
    assert!(err.is_err());
}
