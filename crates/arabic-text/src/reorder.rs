//! Bidi reordering into visual order
//!
//! Page content draws glyphs left to right at increasing x, so RTL text
//! has to be handed over in visual order. This runs the Unicode bidi
//! algorithm over the (already shaped) string and reverses the RTL runs,
//! mirroring paired brackets inside them.

use unicode_bidi::{BidiInfo, Level};

/// Mirror for paired punctuation inside an RTL run.
fn mirror(c: char) -> char {
    match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        _ => c,
    }
}

/// Reorder a logical-order string into visual (left-to-right) order.
///
/// The paragraph level is forced RTL: these are Arabic field values, so
/// even one starting with Latin text lays out as an RTL paragraph. LTR
/// runs embedded in it (digits, Latin names) keep their internal order.
pub fn reorder_visual(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let bidi = BidiInfo::new(text, Some(Level::rtl()));
    let mut out = String::with_capacity(text.len());

    for para in &bidi.paragraphs {
        let (levels, runs) = bidi.visual_runs(para, para.range.clone());
        for run in runs {
            if levels[run.start].is_rtl() {
                for c in text[run].chars().rev() {
                    out.push(mirror(c));
                }
            } else {
                out.push_str(&text[run]);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reorder_rtl_reverses() {
        // shaped meem heh meem dal reads right to left
        assert_eq!(
            reorder_visual("\u{FEE3}\u{FEA4}\u{FEE4}\u{FEAA}"),
            "\u{FEAA}\u{FEE4}\u{FEA4}\u{FEE3}"
        );
    }

    #[test]
    fn test_reorder_ltr_untouched() {
        assert_eq!(reorder_visual("ABC123"), "ABC123");
        assert_eq!(reorder_visual(""), "");
    }

    #[test]
    fn test_digits_keep_order_in_rtl() {
        // numbers inside Arabic text stay left to right
        let visual = reorder_visual("\u{FEAD}\u{FED5}\u{FEE2} 123");
        assert!(visual.contains("123"));
        let digits_at = visual.find("123").unwrap();
        let reh_at = visual.find('\u{FEAD}').unwrap();
        // the Arabic word moves to the right of the number
        assert!(digits_at < reh_at);
    }

    #[test]
    fn test_latin_prefix_keeps_rtl_paragraph() {
        // the paragraph stays RTL even when the value starts with Latin
        // text, so the leading Latin run lands on the right
        assert_eq!(
            reorder_visual("AB \u{FEAD}\u{FED5}"),
            "\u{FED5}\u{FEAD} AB"
        );
    }

    #[test]
    fn test_brackets_mirrored_in_rtl() {
        let visual = reorder_visual("\u{FEAD}(\u{FED5})");
        // parentheses swap so they still open toward the enclosed text
        assert_eq!(visual, "(\u{FED5})\u{FEAD}");
    }
}
