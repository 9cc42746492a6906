//! Box-grid layout planning
//!
//! The template carries pre-printed grids of fixed-size cells for numeric
//! and date fields. This module turns an input string and an origin into
//! the exact cells and slash glyphs to draw, as pure data; the composer
//! paints the plan. All coordinates are PDF bottom-origin points.

use pdf_form::base_text_width;

pub const CELL_WIDTH: f32 = 16.5;
pub const CELL_HEIGHT: f32 = 21.0;
pub const CELL_GAP: f32 = 0.2;
pub const BORDER_WIDTH: f32 = 0.6;
pub const DIGIT_SIZE: f32 = 12.0;
pub const SLASH_SIZE: f32 = 14.0;

/// Horizontal room a slash occupies between cell groups.
const SLASH_PAIR_ADVANCE: f32 = 10.0;
const DATE_SLASH_ADVANCE: f32 = 8.0;

/// One bordered cell. `glyph` is None for a drawn-but-empty cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x: f32,
    pub y: f32,
    pub glyph: Option<char>,
}

/// An un-bordered slash glyph between cell groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slash {
    pub x: f32,
    pub y: f32,
}

/// The cells and slashes one field draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPlan {
    pub cells: Vec<Cell>,
    pub slashes: Vec<Slash>,
    /// Set when the input was wider than the grid and was cut down.
    pub truncated: bool,
}

impl LayoutPlan {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Baseline position for a glyph centered in a cell.
pub fn glyph_origin(cell: &Cell) -> Option<(f32, f32, char)> {
    let glyph = cell.glyph?;
    let width = base_text_width(&glyph.to_string(), DIGIT_SIZE);
    let gx = cell.x + (CELL_WIDTH - width) / 2.0;
    let gy = cell.y + (CELL_HEIGHT - DIGIT_SIZE) / 2.0 + 3.0;
    Some((gx, gy, glyph))
}

fn cell_x(origin_x: f32, index: usize) -> f32 {
    origin_x + index as f32 * (CELL_WIDTH + CELL_GAP)
}

fn slash_at(group_end_x: f32, origin_y: f32) -> Slash {
    Slash {
        x: group_end_x + 2.0,
        y: origin_y + CELL_HEIGHT / 2.0 - 2.0,
    }
}

/// Keep only ASCII digits. Thousands separators and stray spaces in
/// legacy data are dropped rather than rejected.
fn clean_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Plain run: one cell per digit, as many cells as digits.
pub fn plan_run(value: &str, x: f32, y: f32) -> LayoutPlan {
    let digits = clean_digits(value);
    let cells = digits
        .chars()
        .enumerate()
        .map(|(i, glyph)| Cell {
            x: cell_x(x, i),
            y,
            glyph: Some(glyph),
        })
        .collect();

    LayoutPlan {
        cells,
        slashes: Vec::new(),
        truncated: false,
    }
}

/// Fixed seven-cell numeric run for salary fields.
///
/// Anything after a decimal point is dropped, then non-digits. All seven
/// cells are always drawn; digits fill from the left and trailing cells
/// stay empty. Wider inputs are visibly cut to the first seven digits,
/// never drawn past cell 7.
pub fn plan_fixed7(value: &str, x: f32, y: f32) -> LayoutPlan {
    let integral = value.split('.').next().unwrap_or(value);
    let mut digits = clean_digits(integral);
    if digits.is_empty() {
        // unparsable numeric input cleans to zero
        digits.push('0');
    }

    let truncated = digits.chars().count() > 7;
    if truncated {
        digits.truncate(
            digits
                .char_indices()
                .nth(7)
                .map(|(i, _)| i)
                .unwrap_or(digits.len()),
        );
    }

    let glyphs: Vec<char> = digits.chars().collect();
    let cells = (0..7)
        .map(|i| Cell {
            x: cell_x(x, i),
            y,
            glyph: glyphs.get(i).copied(),
        })
        .collect();

    LayoutPlan {
        cells,
        slashes: Vec::new(),
        truncated,
    }
}

/// Slash-separated six-digit run: three cells, a slash, three more cells
/// shifted right past the slash. Input is left-zero-padded to six digits.
pub fn plan_slash_pair(value: &str, x: f32, y: f32) -> LayoutPlan {
    let mut digits = clean_digits(value);
    let truncated = digits.len() > 6;
    if truncated {
        digits.truncate(6);
    }
    let padded = format!("{digits:0>6}");
    let glyphs: Vec<char> = padded.chars().collect();

    let mut cells = Vec::with_capacity(6);
    for (i, &glyph) in glyphs.iter().take(3).enumerate() {
        cells.push(Cell {
            x: cell_x(x, i),
            y,
            glyph: Some(glyph),
        });
    }
    let slash = slash_at(cell_x(x, 3), y);
    for (i, &glyph) in glyphs.iter().skip(3).enumerate() {
        cells.push(Cell {
            x: cell_x(x, 3 + i) + SLASH_PAIR_ADVANCE,
            y,
            glyph: Some(glyph),
        });
    }

    LayoutPlan {
        cells,
        slashes: vec![slash],
        truncated,
    }
}

/// Date run: `YYYY-MM-DD` as year/month/day cell groups with a slash
/// between each. Returns None for anything that does not split into
/// exactly three dash-separated parts; the field draws nothing. Part
/// characters render as-is, so bad data lands visibly in the cells
/// instead of vanishing.
pub fn plan_date(value: &str, x: f32, y: f32) -> Option<LayoutPlan> {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != 3 {
        return None;
    }

    let year = pad_group(parts[0], 4);
    let month = pad_group(parts[1], 2);
    let day = pad_group(parts[2], 2);

    let mut cells = Vec::with_capacity(8);
    let mut slashes = Vec::with_capacity(2);

    for (i, glyph) in year.chars().enumerate() {
        cells.push(Cell {
            x: cell_x(x, i),
            y,
            glyph: Some(glyph),
        });
    }
    slashes.push(slash_at(cell_x(x, 4), y));
    for (i, glyph) in month.chars().enumerate() {
        cells.push(Cell {
            x: cell_x(x, 4 + i) + DATE_SLASH_ADVANCE,
            y,
            glyph: Some(glyph),
        });
    }
    slashes.push(slash_at(cell_x(x, 6) + DATE_SLASH_ADVANCE, y));
    for (i, glyph) in day.chars().enumerate() {
        cells.push(Cell {
            x: cell_x(x, 6 + i) + 2.0 * DATE_SLASH_ADVANCE,
            y,
            glyph: Some(glyph),
        });
    }

    Some(LayoutPlan {
        cells,
        slashes,
        truncated: false,
    })
}

/// Left-zero-pad to `width`; overlong parts keep their rightmost characters.
fn pad_group(part: &str, width: usize) -> String {
    let chars: Vec<char> = part.chars().collect();
    if chars.len() >= width {
        chars[chars.len() - width..].iter().collect()
    } else {
        let mut out = String::with_capacity(width);
        for _ in 0..width - chars.len() {
            out.push('0');
        }
        out.extend(chars);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn glyphs(plan: &LayoutPlan) -> Vec<Option<char>> {
        plan.cells.iter().map(|c| c.glyph).collect()
    }

    #[test]
    fn test_plain_run_one_cell_per_digit() {
        let plan = plan_run("12345678901234", 275.0, 550.0);
        assert_eq!(plan.cells.len(), 14);
        assert_eq!(plan.cells[0].glyph, Some('1'));
        assert_eq!(plan.cells[13].glyph, Some('4'));

        // cells advance by width + gap
        for (i, cell) in plan.cells.iter().enumerate() {
            let expected = 275.0 + i as f32 * (CELL_WIDTH + CELL_GAP);
            assert!((cell.x - expected).abs() < 1e-4);
            assert_eq!(cell.y, 550.0);
        }
    }

    #[test]
    fn test_plain_run_drops_separators() {
        let plan = plan_run("12 34-56", 0.0, 0.0);
        assert_eq!(glyphs(&plan), vec![
            Some('1'),
            Some('2'),
            Some('3'),
            Some('4'),
            Some('5'),
            Some('6')
        ]);
    }

    #[test]
    fn test_fixed7_partial_fill() {
        let plan = plan_fixed7("1,234", 5.0, 387.0);
        assert_eq!(plan.cells.len(), 7);
        assert_eq!(glyphs(&plan), vec![
            Some('1'),
            Some('2'),
            Some('3'),
            Some('4'),
            None,
            None,
            None
        ]);
        assert!(!plan.truncated);
    }

    #[test]
    fn test_fixed7_single_digit() {
        let plan = plan_fixed7("0", 5.0, 387.0);
        assert_eq!(plan.cells.len(), 7);
        assert_eq!(plan.cells[0].glyph, Some('0'));
        assert!(plan.cells[1..].iter().all(|c| c.glyph.is_none()));
    }

    #[test]
    fn test_fixed7_unparsable_cleans_to_zero() {
        let plan = plan_fixed7("n/a", 0.0, 0.0);
        assert_eq!(plan.cells[0].glyph, Some('0'));
        assert!(plan.cells[1..].iter().all(|c| c.glyph.is_none()));
    }

    #[test]
    fn test_fixed7_truncates_at_decimal_point() {
        let plan = plan_fixed7("1234.56", 0.0, 0.0);
        assert_eq!(glyphs(&plan)[..4], [Some('1'), Some('2'), Some('3'), Some('4')]);
        assert!(glyphs(&plan)[4..].iter().all(Option::is_none));
    }

    #[test]
    fn test_fixed7_overflow_is_cut_and_flagged() {
        let plan = plan_fixed7("123456789", 0.0, 0.0);
        assert_eq!(plan.cells.len(), 7);
        assert_eq!(plan.cells[6].glyph, Some('7'));
        assert!(plan.truncated);
    }

    #[test]
    fn test_slash_pair_full_input() {
        let plan = plan_slash_pair("123456", 246.0, 492.0);
        assert_eq!(glyphs(&plan), vec![
            Some('1'),
            Some('2'),
            Some('3'),
            Some('4'),
            Some('5'),
            Some('6')
        ]);
        assert_eq!(plan.slashes.len(), 1);

        // second group clears the slash
        let gap = plan.cells[3].x - plan.cells[2].x;
        assert!(gap > CELL_WIDTH + CELL_GAP + 5.0);
    }

    #[test]
    fn test_slash_pair_zero_pads() {
        let plan = plan_slash_pair("42", 0.0, 0.0);
        assert_eq!(glyphs(&plan), vec![
            Some('0'),
            Some('0'),
            Some('0'),
            Some('0'),
            Some('4'),
            Some('2')
        ]);
    }

    #[test]
    fn test_date_layout() {
        let plan = plan_date("2024-01-05", 300.0, 462.0).unwrap();
        assert_eq!(glyphs(&plan), vec![
            Some('2'),
            Some('0'),
            Some('2'),
            Some('4'),
            Some('0'),
            Some('1'),
            Some('0'),
            Some('5')
        ]);
        assert_eq!(plan.slashes.len(), 2);
        // month and day groups step past their slashes
        assert!(plan.cells[4].x > plan.cells[3].x + CELL_WIDTH);
        assert!(plan.cells[6].x > plan.cells[5].x + CELL_WIDTH);
    }

    #[test]
    fn test_date_pads_short_parts() {
        let plan = plan_date("2024-1-5", 0.0, 0.0).unwrap();
        let g = glyphs(&plan);
        assert_eq!(g[4..6], [Some('0'), Some('1')]);
        assert_eq!(g[6..8], [Some('0'), Some('5')]);
    }

    #[test]
    fn test_date_rejects_wrong_part_count() {
        assert!(plan_date("2024/01/05", 0.0, 0.0).is_none());
        assert!(plan_date("2024-01", 0.0, 0.0).is_none());
        assert!(plan_date("2024-01-05-extra", 0.0, 0.0).is_none());
        assert!(plan_date("", 0.0, 0.0).is_none());
    }

    #[test]
    fn test_date_nondigit_parts_render_visibly() {
        // bad data lands in the cells rather than vanishing
        let plan = plan_date("2024-01-xx", 0.0, 0.0).unwrap();
        let g = glyphs(&plan);
        assert_eq!(g[6..8], [Some('x'), Some('x')]);
    }

    #[test]
    fn test_glyph_origin_centers_digit() {
        let cell = Cell {
            x: 100.0,
            y: 200.0,
            glyph: Some('5'),
        };
        let (gx, gy, glyph) = glyph_origin(&cell).unwrap();
        assert_eq!(glyph, '5');
        // digit is 556/1000 em at size 12 = 6.672 wide
        assert!((gx - (100.0 + (CELL_WIDTH - 6.672) / 2.0)).abs() < 1e-3);
        assert!((gy - (200.0 + (CELL_HEIGHT - DIGIT_SIZE) / 2.0 + 3.0)).abs() < 1e-3);

        let empty = Cell {
            x: 0.0,
            y: 0.0,
            glyph: None,
        };
        assert!(glyph_origin(&empty).is_none());
    }
}
