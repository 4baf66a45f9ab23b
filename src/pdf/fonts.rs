//! Font metrics for PDF layout and the Helvetica replacement face.
//!
//! Widths are in 1/1000 em, as stored in PDF font dictionaries and AFM files.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

use super::layout::get_number;

/// Base font name of the replacement face.
pub const HELVETICA: &str = "Helvetica";

/// Helvetica ascender as a fraction of the font size.
pub const HELVETICA_ASCENT: f32 = 0.718;

/// Helvetica descender depth as a fraction of the font size.
pub const HELVETICA_DESCENT: f32 = 0.207;

/// Helvetica widths for WinAnsi codes 32..=126.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// WinAnsi codes 0x80..=0x9F that differ from Latin-1, with their Helvetica widths.
const WIN_ANSI_EXTRAS: [(char, u8, u16); 27] = [
    ('€', 0x80, 556),
    ('‚', 0x82, 222),
    ('ƒ', 0x83, 556),
    ('„', 0x84, 333),
    ('…', 0x85, 1000),
    ('†', 0x86, 556),
    ('‡', 0x87, 556),
    ('ˆ', 0x88, 333),
    ('‰', 0x89, 1000),
    ('Š', 0x8A, 667),
    ('‹', 0x8B, 333),
    ('Œ', 0x8C, 1000),
    ('Ž', 0x8E, 611),
    ('\u{2018}', 0x91, 222),
    ('\u{2019}', 0x92, 222),
    ('\u{201C}', 0x93, 333),
    ('\u{201D}', 0x94, 333),
    ('•', 0x95, 350),
    ('–', 0x96, 556),
    ('—', 0x97, 1000),
    ('˜', 0x98, 333),
    ('™', 0x99, 1000),
    ('š', 0x9A, 500),
    ('›', 0x9B, 333),
    ('œ', 0x9C, 944),
    ('ž', 0x9E, 500),
    ('Ÿ', 0x9F, 667),
];

/// Width used for Latin-1 letters and anything without a table entry.
const DEFAULT_WIDTH: f32 = 556.0;

/// Byte written for characters WinAnsi cannot represent.
const REPLACEMENT_BYTE: u8 = b'?';

/// Remove a subset tag such as `ABCDEF+` from a base font name.
pub fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Map a character to its WinAnsi byte, if it has one.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(ch as u32 as u8),
        _ => WIN_ANSI_EXTRAS
            .iter()
            .find(|(c, _, _)| *c == ch)
            .map(|(_, code, _)| *code),
    }
}

/// Encode text as WinAnsi bytes, returning the bytes and the number of
/// characters that had to be replaced.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, usize) {
    let mut missing = 0;
    let bytes = text
        .chars()
        .map(|ch| {
            win_ansi_byte(ch).unwrap_or_else(|| {
                missing += 1;
                REPLACEMENT_BYTE
            })
        })
        .collect();
    (bytes, missing)
}

/// Helvetica width of a WinAnsi code.
pub fn helvetica_code_width(code: u8) -> f32 {
    match code {
        0x20..=0x7E => HELVETICA_ASCII[(code - 0x20) as usize] as f32,
        0x80..=0x9F => WIN_ANSI_EXTRAS
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(_, _, w)| *w as f32)
            .unwrap_or(DEFAULT_WIDTH),
        0xA0 => 278.0,
        _ => DEFAULT_WIDTH,
    }
}

/// Helvetica width of a character, using the glyph drawn for it.
pub fn helvetica_char_width(ch: char) -> f32 {
    helvetica_code_width(win_ansi_byte(ch).unwrap_or(REPLACEMENT_BYTE))
}

/// Width of `text` in Helvetica at `size`, in user-space units.
pub fn helvetica_text_width(text: &str, size: f32) -> f32 {
    text.chars().map(helvetica_char_width).sum::<f32>() * size / 1000.0
}

/// Glyph advance source for one font resource.
#[derive(Debug, Clone)]
enum GlyphWidths {
    /// Simple font with a `/Widths` array
    Simple {
        first_char: u32,
        widths: Vec<f32>,
        missing: f32,
    },
    /// Composite font with a descendant `/W` array
    Composite {
        default: f32,
        widths: HashMap<u32, f32>,
    },
    /// Standard font without widths
    Standard { monospace: bool },
}

/// Metrics of a font resource as used by the layout analyzer.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Base font name with any subset tag removed
    pub base_font: String,
    widths: GlyphWidths,
}

impl FontMetrics {
    /// Read metrics from a font dictionary.
    pub fn from_dict(doc: &Document, font: &Dictionary) -> Self {
        let base_font = name_of(doc, font, b"BaseFont")
            .map(|n| strip_subset_tag(&n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let widths = if name_of(doc, font, b"Subtype").as_deref() == Some("Type0") {
            composite_widths(doc, font)
        } else {
            simple_widths(doc, font).unwrap_or(GlyphWidths::Standard {
                monospace: base_font.starts_with("Courier"),
            })
        };

        Self { base_font, widths }
    }

    /// Metrics for a font name that has no dictionary.
    pub fn fallback(name: &str) -> Self {
        Self {
            base_font: strip_subset_tag(name).to_string(),
            widths: GlyphWidths::Standard { monospace: false },
        }
    }

    /// Number of bytes per character code.
    pub fn code_length(&self) -> usize {
        match self.widths {
            GlyphWidths::Composite { .. } => 2,
            _ => 1,
        }
    }

    /// Split a string operand into character codes.
    pub fn codes<'a>(&self, bytes: &'a [u8]) -> impl Iterator<Item = u32> + 'a {
        let len = self.code_length();
        bytes.chunks(len).map(|chunk| {
            chunk
                .iter()
                .fold(0u32, |code, &b| (code << 8) | u32::from(b))
        })
    }

    /// Advance width of a character code in 1/1000 em.
    pub fn code_width(&self, code: u32) -> f32 {
        match &self.widths {
            GlyphWidths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing),
            GlyphWidths::Composite { default, widths } => {
                widths.get(&code).copied().unwrap_or(*default)
            }
            GlyphWidths::Standard { monospace: true } => 600.0,
            GlyphWidths::Standard { monospace: false } => {
                u8::try_from(code).map_or(DEFAULT_WIDTH, helvetica_code_width)
            }
        }
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn get_resolved<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|o| resolve(doc, o))
}

fn name_of(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    get_resolved(doc, dict, key)
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
}

fn simple_widths(doc: &Document, font: &Dictionary) -> Option<GlyphWidths> {
    let widths = get_resolved(doc, font, b"Widths")?.as_array().ok()?;
    let first_char = get_resolved(doc, font, b"FirstChar")
        .and_then(get_number)
        .unwrap_or(0.0) as u32;
    let missing = get_resolved(doc, font, b"FontDescriptor")
        .and_then(|d| d.as_dict().ok())
        .and_then(|d| get_resolved(doc, d, b"MissingWidth"))
        .and_then(get_number)
        .unwrap_or(0.0);

    Some(GlyphWidths::Simple {
        first_char,
        widths: widths
            .iter()
            .map(|w| get_number(resolve(doc, w)).unwrap_or(missing))
            .collect(),
        missing,
    })
}

fn composite_widths(doc: &Document, font: &Dictionary) -> GlyphWidths {
    let descendant = get_resolved(doc, font, b"DescendantFonts")
        .and_then(|o| o.as_array().ok())
        .and_then(|a| a.first())
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok());

    let Some(descendant) = descendant else {
        return GlyphWidths::Composite {
            default: 1000.0,
            widths: HashMap::new(),
        };
    };

    let default = get_resolved(doc, descendant, b"DW")
        .and_then(get_number)
        .unwrap_or(1000.0);
    let mut widths = HashMap::new();

    // /W entries are either `c [w1 w2 ...]` or `c_first c_last w`.
    if let Some(entries) = get_resolved(doc, descendant, b"W").and_then(|o| o.as_array().ok()) {
        let mut i = 0;
        while i < entries.len() {
            let Some(start) = get_number(resolve(doc, &entries[i])).map(|n| n as u32) else {
                break;
            };
            match entries.get(i + 1).map(|o| resolve(doc, o)) {
                Some(Object::Array(list)) => {
                    for (offset, w) in list.iter().enumerate() {
                        if let Some(w) = get_number(resolve(doc, w)) {
                            widths.insert(start + offset as u32, w);
                        }
                    }
                    i += 2;
                }
                Some(end) => {
                    let end = get_number(end).map(|n| n as u32).unwrap_or(start);
                    let w = entries
                        .get(i + 2)
                        .and_then(|o| get_number(resolve(doc, o)))
                        .unwrap_or(default);
                    for code in start..=end {
                        widths.insert(code, w);
                    }
                    i += 3;
                }
                None => break,
            }
        }
    }

    GlyphWidths::Composite { default, widths }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_strip_subset_tag() {
        assert_eq!(strip_subset_tag("ABCDEF+Calibri"), "Calibri");
        assert_eq!(strip_subset_tag("Calibri"), "Calibri");
        assert_eq!(strip_subset_tag("abcdef+Calibri"), "abcdef+Calibri");
        assert_eq!(strip_subset_tag("ABC+Calibri"), "ABC+Calibri");
    }

    #[test]
    fn test_helvetica_widths() {
        assert_eq!(helvetica_char_width(' '), 278.0);
        assert_eq!(helvetica_char_width('W'), 944.0);
        assert_eq!(helvetica_char_width('i'), 222.0);
        assert_eq!(helvetica_char_width('•'), 350.0);
        assert!((helvetica_text_width("Hello", 10.0) - 22.78).abs() < 0.01);
    }

    #[test]
    fn test_encode_win_ansi() {
        let (bytes, missing) = encode_win_ansi("Café – ok");
        assert_eq!(bytes, vec![b'C', b'a', b'f', 0xE9, b' ', 0x96, b' ', b'o', b'k']);
        assert_eq!(missing, 0);

        let (bytes, missing) = encode_win_ansi("→x");
        assert_eq!(bytes, vec![b'?', b'x']);
        assert_eq!(missing, 1);
    }

    #[test]
    fn test_simple_font_widths() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+Arial",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(600), Object::Integer(700)],
        };
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.base_font, "Arial");
        assert_eq!(metrics.code_width(65), 600.0);
        assert_eq!(metrics.code_width(66), 700.0);
        assert_eq!(metrics.code_width(67), 0.0);
        assert_eq!(metrics.code_length(), 1);
    }

    #[test]
    fn test_standard_font_falls_back_to_helvetica() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.code_width(b'W' as u32), 944.0);

        let courier = dictionary! { "Subtype" => "Type1", "BaseFont" => "Courier" };
        assert_eq!(FontMetrics::from_dict(&doc, &courier).code_width(b'i' as u32), 600.0);
    }

    #[test]
    fn test_composite_font_widths() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Subtype" => "Type0",
            "BaseFont" => "XYZABC+NotoSans",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "DW" => 500,
                "W" => vec![
                    Object::Integer(3),
                    Object::Array(vec![Object::Integer(250), Object::Integer(300)]),
                    Object::Integer(10),
                    Object::Integer(12),
                    Object::Integer(700),
                ],
            })],
        };
        let metrics = FontMetrics::from_dict(&doc, &font);
        assert_eq!(metrics.code_length(), 2);
        assert_eq!(metrics.code_width(3), 250.0);
        assert_eq!(metrics.code_width(4), 300.0);
        assert_eq!(metrics.code_width(11), 700.0);
        assert_eq!(metrics.code_width(99), 500.0);
        let codes: Vec<u32> = metrics.codes(&[0x00, 0x03, 0x01, 0x00]).collect();
        assert_eq!(codes, vec![3, 256]);
    }
}
