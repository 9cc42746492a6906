//! Content-stream operator builders
//!
//! All coordinates are PDF user-space coordinates (origin bottom-left),
//! matching the template's printed grid. Callers pass the design constants
//! straight through; no top-origin conversion happens here.

/// Generate operators for one grid cell: a white-filled rectangle with a
/// black border of the given line width.
pub fn cell_operators(x: f32, y: f32, width: f32, height: f32, line_width: f32) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("q\n");
    ops.push_str("1 1 1 rg\n");
    ops.push_str(&format!("{x} {y} {width} {height} re f\n"));
    ops.push_str("0 0 0 RG\n");
    ops.push_str(&format!("{line_width} w\n"));
    ops.push_str(&format!("{x} {y} {width} {height} re S\n"));
    ops.push_str("Q\n");

    ops.into_bytes()
}

/// Generate text operators for a literal (WinAnsi) string in a base font.
///
/// Used for digits, slashes, and flattened field values. Parentheses and
/// backslashes are escaped per the PDF string syntax.
pub fn literal_text_operators(
    text: &str,
    x: f32,
    y: f32,
    font_resource: &str,
    font_size: f32,
) -> Vec<u8> {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str("0 0 0 rg\n");
    ops.push_str(&format!("/{font_resource} {font_size} Tf\n"));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("({escaped}) Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Generate text operators for hex-encoded glyph IDs in an embedded
/// Identity-H font.
pub fn shaped_text_operators(
    text_hex: &str,
    x: f32,
    y: f32,
    font_resource: &str,
    font_size: f32,
) -> Vec<u8> {
    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str("0 0 0 rg\n");
    ops.push_str(&format!("/{font_resource} {font_size} Tf\n"));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Helvetica-Bold advance width in 1/1000 em units (standard-14 AFM data).
///
/// The base font is never embedded, so widths come from the published
/// metrics. Only the characters the composer actually draws are listed;
/// anything else falls back to the space width.
fn helvetica_bold_width_millis(c: char) -> u32 {
    match c {
        '0'..='9' => 556,
        '/' => 278,
        '.' => 278,
        ',' => 278,
        '-' => 333,
        ':' => 333,
        ' ' => 278,
        'A'..='Z' => 722,
        'a'..='z' => 556,
        _ => 278,
    }
}

/// Width in points of a string set in non-embedded Helvetica-Bold.
pub fn base_text_width(text: &str, font_size: f32) -> f32 {
    let millis: u32 = text.chars().map(helvetica_bold_width_millis).sum();
    millis as f32 / 1000.0 * font_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_operators() {
        let ops = cell_operators(10.0, 20.0, 16.5, 21.0, 0.6);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("q\n"));
        assert!(ops_str.contains("1 1 1 rg"));
        assert!(ops_str.contains("10 20 16.5 21 re f"));
        assert!(ops_str.contains("0 0 0 RG"));
        assert!(ops_str.contains("0.6 w"));
        assert!(ops_str.contains("10 20 16.5 21 re S"));
        assert!(ops_str.ends_with("Q\n"));
    }

    #[test]
    fn test_literal_text_operators() {
        let ops = literal_text_operators("7", 100.0, 550.0, "Fb1", 12.0);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("BT"));
        assert!(ops_str.contains("/Fb1 12 Tf"));
        assert!(ops_str.contains("100 550 Td"));
        assert!(ops_str.contains("(7) Tj"));
        assert!(ops_str.contains("ET"));
    }

    #[test]
    fn test_literal_text_operators_escapes_parens() {
        let ops = literal_text_operators("(a)\\b", 0.0, 0.0, "Fb1", 12.0);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("(\\(a\\)\\\\b) Tj"));
    }

    #[test]
    fn test_shaped_text_operators() {
        let ops = shaped_text_operators("<FEAAFEE4>", 480.0, 650.0, "F1", 14.0);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("/F1 14 Tf"));
        assert!(ops_str.contains("480 650 Td"));
        assert!(ops_str.contains("<FEAAFEE4> Tj"));
    }

    #[test]
    fn test_base_text_width_digits() {
        // Every digit is 556/1000 em in Helvetica-Bold.
        let width = base_text_width("5", 12.0);
        assert!((width - 6.672).abs() < 1e-4);

        let width = base_text_width("55", 12.0);
        assert!((width - 13.344).abs() < 1e-4);
    }

    #[test]
    fn test_base_text_width_slash() {
        let width = base_text_width("/", 14.0);
        assert!((width - 3.892).abs() < 1e-4);
    }

    #[test]
    fn test_base_text_width_empty() {
        assert_eq!(base_text_width("", 12.0), 0.0);
    }
}
