//! Arabic Text - Arabic shaping and bidi reordering
//!
//! This crate prepares logical-order Arabic strings for drawing into PDF
//! content streams, which place glyphs left to right:
//! - Contextual shaping into Unicode presentation forms (U+FE70..U+FEFF),
//!   including lam-alef ligatures
//! - Bidi reordering into visual order, with bracket mirroring
//!
//! # Example
//!
//! ```
//! use arabic_text::{contains_arabic, render_visual};
//!
//! assert!(contains_arabic("شركة النور"));
//! // shaped and reordered, ready to draw left to right
//! let visual = render_visual("محمد");
//! assert_eq!(visual, "\u{FEAA}\u{FEE4}\u{FEA4}\u{FEE3}");
//! ```

mod reorder;
mod shaping;

pub use reorder::reorder_visual;
pub use shaping::shape;

/// Whether the text contains any character from the Arabic blocks,
/// including presentation forms.
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0600}'..='\u{06FF}'
                | '\u{0750}'..='\u{077F}'
                | '\u{FB50}'..='\u{FDFF}'
                | '\u{FE70}'..='\u{FEFF}'
        )
    })
}

/// Shape and reorder in one step: logical-order input, visual-order
/// presentation forms out. Text without Arabic passes through unchanged.
pub fn render_visual(text: &str) -> String {
    if !contains_arabic(text) {
        return text.to_string();
    }
    reorder_visual(&shape(text))
}
