use pdf_writer::{Name, Pdf, Ref};

use crate::pdf::MM_PER_PT;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

impl FontStyle {
    pub(crate) const ALL: [FontStyle; 3] = [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic];

    pub(crate) fn base_font(self) -> &'static [u8] {
        match self {
            FontStyle::Regular => b"Helvetica",
            FontStyle::Bold => b"Helvetica-Bold",
            FontStyle::Italic => b"Helvetica-Oblique",
        }
    }

    /// Resource name used inside content streams.
    pub(crate) fn resource_name(self) -> &'static [u8] {
        match self {
            FontStyle::Regular => b"F1",
            FontStyle::Bold => b"F2",
            FontStyle::Italic => b"F3",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
            FontStyle::Regular | FontStyle::Italic => &HELVETICA_WIDTHS,
        }
    }

    /// Width of one character in 1000-units. Accented Latin letters use the
    /// width of their base letter.
    pub(crate) fn char_width_1000(self, ch: char) -> f32 {
        let ch = fold_accent(normalize(ch));
        match ch as u32 {
            32..=126 => self.widths()[(ch as u32 - 32) as usize] as f32,
            0xB0 => 400.0,
            0xBA | 0xAA => 365.0,
            _ => 556.0,
        }
    }
}

/// Helvetica AFM advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold AFM advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

pub(crate) fn fold_accent(ch: char) -> char {
    match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => ch,
    }
}

/// Characters outside WinAnsi that have a close ASCII stand-in.
fn normalize(ch: char) -> char {
    match ch {
        '\u{2032}' => '\'',
        '\u{2033}' => '"',
        '\u{2212}' => '-',
        '\u{00A0}' => ' ',
        _ => ch,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Unmappable characters are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(normalize)
        .filter_map(|c| match c as u32 {
            0x0020..=0x007E => Some(c as u8),
            0x00A1..=0x00FF => Some(c as u8),
            0x20AC => Some(0x80),
            0x2026 => Some(0x85),
            0x2018 => Some(0x91),
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95),
            0x2013 => Some(0x96),
            0x2014 => Some(0x97),
            0x2122 => Some(0x99),
            _ => None,
        })
        .collect()
}

/// Advance width of `text` in points.
pub fn text_width_pt(text: &str, style: FontStyle, size_pt: f32) -> f32 {
    text.chars()
        .map(|ch| style.char_width_1000(ch) * size_pt / 1000.0)
        .sum()
}

/// Advance width of `text` in millimetres.
pub fn text_width_mm(text: &str, style: FontStyle, size_pt: f32) -> f32 {
    text_width_pt(text, style, size_pt) * MM_PER_PT
}

/// Write the three Type1 font dictionaries and return their references.
pub(crate) fn register_fonts(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
) -> Vec<(FontStyle, Ref)> {
    FontStyle::ALL
        .iter()
        .map(|&style| {
            let font_ref = alloc();
            pdf.type1_font(font_ref)
                .base_font(Name(style.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            (style, font_ref)
        })
        .collect()
}
