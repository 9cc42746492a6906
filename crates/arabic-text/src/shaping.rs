//! Contextual shaping to Arabic presentation forms
//!
//! Arabic letters in the U+0600 block are abstract; which glyph a letter
//! takes depends on whether it connects to its neighbours. This module
//! rewrites a logical-order string into the presentation-forms blocks
//! (U+FB50..U+FEFF) so the result can be drawn one glyph per character
//! without an OpenType shaping engine.

/// The four contextual forms of a letter: isolated, final, initial, medial.
///
/// Right-joining letters repeat isolated/final in the initial/medial slots;
/// they can never take those shapes, and the joining walk never selects them.
#[derive(Debug, Clone, Copy)]
struct Forms {
    isolated: char,
    final_: char,
    initial: char,
    medial: char,
}

impl Forms {
    const fn dual(isolated: char, final_: char, initial: char, medial: char) -> Self {
        Self {
            isolated,
            final_,
            initial,
            medial,
        }
    }

    const fn right(isolated: char, final_: char) -> Self {
        Self {
            isolated,
            final_,
            initial: isolated,
            medial: final_,
        }
    }
}

/// Presentation forms for one base letter, or None for anything that is
/// not a shapeable Arabic letter.
fn forms(c: char) -> Option<Forms> {
    let f = match c {
        '\u{0621}' => Forms::right('\u{FE80}', '\u{FE80}'), // hamza
        '\u{0622}' => Forms::right('\u{FE81}', '\u{FE82}'), // alef madda
        '\u{0623}' => Forms::right('\u{FE83}', '\u{FE84}'), // alef hamza above
        '\u{0624}' => Forms::right('\u{FE85}', '\u{FE86}'), // waw hamza
        '\u{0625}' => Forms::right('\u{FE87}', '\u{FE88}'), // alef hamza below
        '\u{0626}' => Forms::dual('\u{FE89}', '\u{FE8A}', '\u{FE8B}', '\u{FE8C}'),
        '\u{0627}' => Forms::right('\u{FE8D}', '\u{FE8E}'), // alef
        '\u{0628}' => Forms::dual('\u{FE8F}', '\u{FE90}', '\u{FE91}', '\u{FE92}'),
        '\u{0629}' => Forms::right('\u{FE93}', '\u{FE94}'), // teh marbuta
        '\u{062A}' => Forms::dual('\u{FE95}', '\u{FE96}', '\u{FE97}', '\u{FE98}'),
        '\u{062B}' => Forms::dual('\u{FE99}', '\u{FE9A}', '\u{FE9B}', '\u{FE9C}'),
        '\u{062C}' => Forms::dual('\u{FE9D}', '\u{FE9E}', '\u{FE9F}', '\u{FEA0}'),
        '\u{062D}' => Forms::dual('\u{FEA1}', '\u{FEA2}', '\u{FEA3}', '\u{FEA4}'),
        '\u{062E}' => Forms::dual('\u{FEA5}', '\u{FEA6}', '\u{FEA7}', '\u{FEA8}'),
        '\u{062F}' => Forms::right('\u{FEA9}', '\u{FEAA}'), // dal
        '\u{0630}' => Forms::right('\u{FEAB}', '\u{FEAC}'), // thal
        '\u{0631}' => Forms::right('\u{FEAD}', '\u{FEAE}'), // reh
        '\u{0632}' => Forms::right('\u{FEAF}', '\u{FEB0}'), // zain
        '\u{0633}' => Forms::dual('\u{FEB1}', '\u{FEB2}', '\u{FEB3}', '\u{FEB4}'),
        '\u{0634}' => Forms::dual('\u{FEB5}', '\u{FEB6}', '\u{FEB7}', '\u{FEB8}'),
        '\u{0635}' => Forms::dual('\u{FEB9}', '\u{FEBA}', '\u{FEBB}', '\u{FEBC}'),
        '\u{0636}' => Forms::dual('\u{FEBD}', '\u{FEBE}', '\u{FEBF}', '\u{FEC0}'),
        '\u{0637}' => Forms::dual('\u{FEC1}', '\u{FEC2}', '\u{FEC3}', '\u{FEC4}'),
        '\u{0638}' => Forms::dual('\u{FEC5}', '\u{FEC6}', '\u{FEC7}', '\u{FEC8}'),
        '\u{0639}' => Forms::dual('\u{FEC9}', '\u{FECA}', '\u{FECB}', '\u{FECC}'),
        '\u{063A}' => Forms::dual('\u{FECD}', '\u{FECE}', '\u{FECF}', '\u{FED0}'),
        '\u{0641}' => Forms::dual('\u{FED1}', '\u{FED2}', '\u{FED3}', '\u{FED4}'),
        '\u{0642}' => Forms::dual('\u{FED5}', '\u{FED6}', '\u{FED7}', '\u{FED8}'),
        '\u{0643}' => Forms::dual('\u{FED9}', '\u{FEDA}', '\u{FEDB}', '\u{FEDC}'),
        '\u{0644}' => Forms::dual('\u{FEDD}', '\u{FEDE}', '\u{FEDF}', '\u{FEE0}'),
        '\u{0645}' => Forms::dual('\u{FEE1}', '\u{FEE2}', '\u{FEE3}', '\u{FEE4}'),
        '\u{0646}' => Forms::dual('\u{FEE5}', '\u{FEE6}', '\u{FEE7}', '\u{FEE8}'),
        '\u{0647}' => Forms::dual('\u{FEE9}', '\u{FEEA}', '\u{FEEB}', '\u{FEEC}'),
        '\u{0648}' => Forms::right('\u{FEED}', '\u{FEEE}'), // waw
        '\u{0649}' => Forms::right('\u{FEEF}', '\u{FEF0}'), // alef maksura
        '\u{064A}' => Forms::dual('\u{FEF1}', '\u{FEF2}', '\u{FEF3}', '\u{FEF4}'),
        _ => return None,
    };
    Some(f)
}

/// Lam-alef ligature (isolated, final) for a given alef variant.
fn lam_alef_ligature(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

/// Combining marks that sit on a base letter and do not interrupt joining.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}')
}

/// Whether a letter can connect to the letter before it (has a final form).
fn joins_previous(c: char) -> bool {
    c == '\u{0640}' || (forms(c).is_some() && c != '\u{0621}')
}

/// Whether a letter can connect to the letter after it (has initial and
/// medial forms). Tatweel joins on both sides but has no presentation form.
fn joins_following(c: char) -> bool {
    match c {
        '\u{0640}' => true,
        '\u{0621}' | '\u{0622}' | '\u{0623}' | '\u{0624}' | '\u{0625}' | '\u{0627}'
        | '\u{0629}' | '\u{062F}' | '\u{0630}' | '\u{0631}' | '\u{0632}' | '\u{0648}'
        | '\u{0649}' => false,
        _ => forms(c).is_some(),
    }
}

/// Nearest non-transparent character before `i`, if any.
fn prev_base(chars: &[char], i: usize) -> Option<char> {
    chars[..i].iter().rev().copied().find(|&c| !is_transparent(c))
}

/// Nearest non-transparent character after `i`, if any.
fn next_base(chars: &[char], i: usize) -> Option<char> {
    chars[i + 1..].iter().copied().find(|&c| !is_transparent(c))
}

/// Index of the nearest non-transparent character after `i`, if any.
fn next_base_index(chars: &[char], i: usize) -> Option<usize> {
    chars[i + 1..]
        .iter()
        .position(|&c| !is_transparent(c))
        .map(|off| i + 1 + off)
}

/// Rewrite a logical-order string into contextual presentation forms.
///
/// Non-Arabic characters pass through unchanged, as do combining marks
/// and tatweel. Lam followed by an alef variant collapses into the
/// lam-alef ligature. The output is still in logical order; visual
/// reordering is a separate step.
pub fn shape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        let f = match forms(c) {
            Some(f) => f,
            None => {
                out.push(c);
                i += 1;
                continue;
            }
        };

        let linked_prev = prev_base(&chars, i)
            .map(|p| joins_following(p) && joins_previous(c))
            .unwrap_or(false);

        // Lam-alef: consume the alef and emit the ligature. The ligature
        // only joins to the right, so its shape depends on linked_prev alone.
        if c == '\u{0644}' {
            if let Some(j) = next_base_index(&chars, i) {
                if let Some((isolated, final_)) = lam_alef_ligature(chars[j]) {
                    out.push(if linked_prev { final_ } else { isolated });
                    for &mark in &chars[i + 1..j] {
                        out.push(mark);
                    }
                    i = j + 1;
                    continue;
                }
            }
        }

        let linked_next = joins_following(c)
            && next_base(&chars, i).map(joins_previous).unwrap_or(false);

        out.push(match (linked_prev, linked_next) {
            (false, false) => f.isolated,
            (false, true) => f.initial,
            (true, false) => f.final_,
            (true, true) => f.medial,
        });
        i += 1;
    }

    out
}
