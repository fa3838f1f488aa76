use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const DEFAULT_SERIF_WORD_FAMILY: &str = "Times New Roman";
const DEFAULT_SANS_WORD_FAMILY: &str = "Arial";
const DEFAULT_MONO_WORD_FAMILY: &str = "Courier New";

/// Advance widths of the printable ASCII range (0x20..=0x7E) in 1/1000 em,
/// taken from the Adobe base-14 AFM files.
const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, //
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, //
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, //
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, //
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, //
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Advance widths of the WinAnsi upper half (0x80..=0xFF), indexed by code
/// minus 0x80. Codes WinAnsi leaves undefined hold 0.
const TIMES_ROMAN_WIN_ANSI_HIGH: [u16; 128] = [
    500, 0, 333, 500, 444, 1000, 500, 500, 333, 1000, 556, 333, 889, 0, 611, 0, //
    0, 333, 333, 444, 444, 350, 500, 1000, 333, 980, 389, 333, 722, 0, 444, 722, //
    250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 333, //
    400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444, //
    722, 722, 722, 722, 722, 722, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333, //
    722, 722, 722, 722, 722, 722, 722, 564, 722, 722, 722, 722, 722, 722, 556, 500, //
    444, 444, 444, 444, 444, 444, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278, //
    500, 500, 500, 500, 500, 500, 500, 564, 500, 500, 500, 500, 500, 500, 500, 500,
];

const HELVETICA_WIN_ANSI_HIGH: [u16; 128] = [
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, //
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667, //
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, //
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, //
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, //
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, //
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Drawn in place of characters WinAnsi cannot encode.
pub const REPLACEMENT_CHAR: char = '?';

const COURIER_ADVANCE: u16 = 600;

/// Tabs advance by this many spaces, both when measuring and when drawing.
pub const TAB_SPACES: usize = 4;

/// Font family used for measuring and rendering a letter.
///
/// The families map onto the PDF standard fonts so that no font program has
/// to be embedded in the paginated export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSpec {
    #[default]
    Serif,
    SansSerif,
    Monospace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascent: i16,
    pub descent: i16,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown font family: {0}")]
pub struct UnknownFontFamily(pub String);

impl FontSpec {
    pub const ALL: [FontSpec; 3] = [FontSpec::Serif, FontSpec::SansSerif, FontSpec::Monospace];

    /// PostScript name of the matching PDF base-14 font.
    pub fn base_font_name(self) -> &'static str {
        match self {
            FontSpec::Serif => "Times-Roman",
            FontSpec::SansSerif => "Helvetica",
            FontSpec::Monospace => "Courier",
        }
    }

    /// Family name written into word-processor documents.
    pub fn word_family(self) -> &'static str {
        match self {
            FontSpec::Serif => DEFAULT_SERIF_WORD_FAMILY,
            FontSpec::SansSerif => DEFAULT_SANS_WORD_FAMILY,
            FontSpec::Monospace => DEFAULT_MONO_WORD_FAMILY,
        }
    }

    pub fn metrics(self) -> FontMetrics {
        let (ascent, descent) = match self {
            FontSpec::Serif => (683, -217),
            FontSpec::SansSerif => (718, -207),
            FontSpec::Monospace => (629, -157),
        };
        FontMetrics {
            units_per_em: 1000,
            ascent,
            descent,
        }
    }

    /// Advance width of `ch` in 1/1000 em, as drawn in the paginated export.
    /// Characters outside WinAnsi are measured as the replacement glyph that
    /// stands in for them.
    pub fn char_advance(self, ch: char) -> u32 {
        if ch == '\t' {
            return self.char_advance(' ') * TAB_SPACES as u32;
        }
        if ch.is_control() {
            return 0;
        }
        if self == FontSpec::Monospace {
            return u32::from(COURIER_ADVANCE);
        }

        let (low, high) = match self {
            FontSpec::Serif => (&TIMES_ROMAN_ASCII, &TIMES_ROMAN_WIN_ANSI_HIGH),
            _ => (&HELVETICA_ASCII, &HELVETICA_WIN_ANSI_HIGH),
        };
        let code = win_ansi_code(ch).unwrap_or(REPLACEMENT_CHAR as u8);
        let width = match code {
            0x20..=0x7E => low[usize::from(code - 0x20)],
            0x80..=0xFF => high[usize::from(code - 0x80)],
            _ => 0,
        };
        u32::from(width)
    }
}

/// Single-byte WinAnsi (CP1252) code of `ch`, if it has one.
pub fn win_ansi_code(ch: char) -> Option<u8> {
    let code = ch as u32;
    if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) {
        return u8::try_from(code).ok();
    }
    let byte = match ch {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FontSpec::Serif => "serif",
            FontSpec::SansSerif => "sans-serif",
            FontSpec::Monospace => "monospace",
        };
        f.write_str(name)
    }
}

impl FromStr for FontSpec {
    type Err = UnknownFontFamily;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "serif" | "times" | "times-roman" => Ok(FontSpec::Serif),
            "sans" | "sans-serif" | "sansserif" | "helvetica" => Ok(FontSpec::SansSerif),
            "mono" | "monospace" | "courier" => Ok(FontSpec::Monospace),
            _ => Err(UnknownFontFamily(value.to_string())),
        }
    }
}
