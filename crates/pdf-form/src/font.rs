//! Embedded Unicode font handling
//!
//! The composer embeds exactly one TrueType font (the Arabic face) as a
//! Type0 / CIDFontType2 composite font with Identity-H encoding, so content
//! streams address glyphs by glyph ID. The font file is embedded whole;
//! with a single face per document there is nothing to gain from subsetting
//! and glyph IDs stay stable from draw time through save.

use crate::{FormError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::BTreeSet;

/// A parsed TrueType font ready for Identity-H embedding.
#[derive(Debug, Clone)]
pub struct UnicodeFont {
    /// PostScript-ish identifier used as the BaseFont name
    pub name: String,
    /// Raw TTF bytes, embedded verbatim as FontFile2
    pub ttf_data: Vec<u8>,
    /// Characters drawn so far (drives the /W widths and ToUnicode CMap)
    pub used_chars: BTreeSet<char>,
    face: Option<ttf_parser::Face<'static>>,
}

impl UnicodeFont {
    /// Parse TTF bytes into an embeddable font.
    ///
    /// The face borrows the font data for the process lifetime; fonts are
    /// loaded once at startup and shared, so the leak is bounded.
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        let data = ttf_data.to_vec();
        let static_data: &'static [u8] = Box::leak(data.clone().into_boxed_slice());

        let face = ttf_parser::Face::parse(static_data, 0)
            .map_err(|e| FormError::FontParseError(format!("{e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data: data,
            used_chars: BTreeSet::new(),
            face: Some(face),
        })
    }

    /// Record characters as used so their widths and Unicode mappings are
    /// emitted at embed time.
    pub fn mark_used(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Glyph ID for a character, if the font maps it.
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face
            .as_ref()
            .and_then(|face| face.glyph_index(c).map(|id| id.0))
    }

    /// Whether the font has a real (non-.notdef) glyph for the character.
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).map(|id| id != 0).unwrap_or(false)
    }

    fn glyph_advance(&self, c: char) -> Option<u16> {
        let face = self.face.as_ref()?;
        let id = face.glyph_index(c)?;
        face.glyph_hor_advance(id)
    }

    fn units_per_em(&self) -> u16 {
        self.face
            .as_ref()
            .map(|face| face.units_per_em())
            .unwrap_or(1000)
    }

    fn ascender(&self) -> i16 {
        self.face
            .as_ref()
            .map(|face| face.ascender())
            .unwrap_or(800)
    }

    fn descender(&self) -> i16 {
        self.face
            .as_ref()
            .map(|face| face.descender())
            .unwrap_or(-200)
    }

    /// Width in points of a string at the given size.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .filter_map(|c| self.glyph_advance(c))
            .map(u32::from)
            .sum();
        units as f32 / self.units_per_em() as f32 * font_size
    }

    /// Encode a string as hex glyph IDs for a Tj operand, e.g. `<FEE3FEA4>`.
    ///
    /// Unmapped characters encode as glyph 0 (.notdef) rather than being
    /// dropped, so defects stay visible in the output.
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut hex = String::with_capacity(text.chars().count() * 4 + 2);
        hex.push('<');
        for c in text.chars() {
            let gid = self.glyph_id(c).unwrap_or(0);
            hex.push_str(&format!("{gid:04X}"));
        }
        hex.push('>');
        hex
    }

    /// Build the PDF objects for this font.
    ///
    /// Returns (type0 dict, cid font dict, descriptor dict, font file
    /// stream, ToUnicode stream). Cross references between them are wired
    /// by the document at embed time, once object IDs exist.
    pub fn to_pdf_objects(&self) -> FontObjects {
        let base_font = Object::Name(self.name.clone().into_bytes());

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![(
                "Length1",
                Object::Integer(self.ttf_data.len() as i64),
            )]),
            self.ttf_data.clone(),
        );

        let ascender = self.ascender();
        let descender = self.descender();
        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", base_font.clone()),
            ("Flags", 4.into()),
            (
                "FontBBox",
                vec![
                    0.into(),
                    descender.into(),
                    (self.units_per_em() as i32).into(),
                    ascender.into(),
                ]
                .into(),
            ),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascender.into()),
            ("Descent", descender.into()),
            ("CapHeight", ascender.into()),
            ("StemV", 80.into()),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", base_font.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("W", self.widths_array().into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", base_font),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
        ]);

        let tounicode = self.tounicode_cmap();
        let tounicode_stream = Stream::new(Dictionary::new(), tounicode.into_bytes());

        FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        }
    }

    /// `/W` array mapping each used glyph ID to its advance width,
    /// normalized to a 1000-unit em.
    fn widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();
        let face = match &self.face {
            Some(f) => f,
            None => return widths,
        };

        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c))
            .collect();
        gids.sort_unstable();
        gids.dedup();

        let scale = 1000.0 / self.units_per_em() as f32;
        for gid in gids {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(gid))
                .unwrap_or(self.units_per_em());
            let scaled = (advance as f32 * scale).round() as i32;
            widths.push(gid.into());
            widths.push(vec![scaled.into()].into());
        }

        widths
    }

    /// ToUnicode CMap content: glyph ID back to Unicode code point, so the
    /// flattened output stays searchable and copyable.
    fn tounicode_cmap(&self) -> String {
        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        // used_chars is a BTreeSet, so emission order is deterministic.
        let chars: Vec<char> = self.used_chars.iter().copied().collect();
        for chunk in chars.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for &c in chunk {
                let gid = self.glyph_id(c).unwrap_or(0);
                cmap.push_str(&format!("<{gid:04X}> <{:04X}>\n", c as u32));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap
    }

    #[cfg(test)]
    pub(crate) fn faceless(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ttf_data: vec![0u8; 16],
            used_chars: BTreeSet::new(),
            face: None,
        }
    }
}

/// PDF objects produced for one embedded font
pub struct FontObjects {
    pub type0_font: Dictionary,
    pub cid_font: Dictionary,
    pub font_descriptor: Dictionary,
    pub font_file_stream: Stream,
    pub tounicode_stream: Stream,
}
