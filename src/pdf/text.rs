//! Text support for the PDF standard fonts
//!
//! Reports use Helvetica and Helvetica-Bold, two of the 14 standard PDF
//! fonts, so nothing has to be embedded. Strings are written in
//! WinAnsiEncoding; characters outside it become `?`.

use lopdf::{Dictionary, Object, StringFormat};

/// Standard fonts available in every report page's resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub const ALL: [StandardFont; 2] = [StandardFont::Helvetica, StandardFont::HelveticaBold];

    /// Resource name used in content streams
    pub fn resource_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F1",
            StandardFont::HelveticaBold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Font dictionary for this font
    pub fn dictionary(self) -> Dictionary {
        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(self.base_font().as_bytes().to_vec()));
        font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        font
    }

    /// Glyph width in 1/1000 em
    fn glyph_width(self, byte: u8) -> u16 {
        let table = match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match byte {
            32..=126 => table[(byte - 32) as usize],
            _ => 556,
        }
    }

    /// Width of `text` in points at `size`
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|b| self.glyph_width(b) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Helvetica widths for characters 32-126 (from the Adobe AFM metrics)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // : - @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [ - `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // { - ~
];

/// Helvetica-Bold widths for characters 32-126
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    333, 333, 584, 584, 584, 611, 975, // : - @
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    333, 278, 333, 584, 556, 333, // [ - `
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a-m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n-z
    389, 280, 389, 584, // { - ~
];

/// Encode text as WinAnsiEncoding bytes
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// Encode and escape text for a literal string operand: `(...)`
pub fn pdf_literal(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for byte in encode_win_ansi(text) {
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
    out
}

/// Text string object for the document information dictionary.
///
/// ASCII stays a literal string; anything else is written as UTF-16BE
/// with a byte order mark.
pub fn info_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a text string written by [`info_string`] or another producer
pub fn decode_info_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Shorten `text` with a trailing "..." until it fits in `max_width` points
pub fn truncate_to_width(text: &str, font: StandardFont, size: f32, max_width: f32) -> String {
    if font.text_width(text, size) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "...";
        if font.text_width(&candidate, size) <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Hi" = 722 + 222 in Helvetica
        let width = StandardFont::Helvetica.text_width("Hi", 10.0);
        assert!((width - 9.44).abs() < 0.001);

        let bold = StandardFont::HelveticaBold.text_width("Hi", 10.0);
        assert!((bold - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Café"), vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn test_pdf_literal_escapes() {
        assert_eq!(pdf_literal(r"Room (A)\B"), b"(Room \\(A\\)\\\\B)".to_vec());
    }

    #[test]
    fn test_info_string_round_trip() {
        for text in ["Lincoln ISD", "Salle d'été"] {
            let object = info_string(text);
            let bytes = object.as_str().unwrap();
            assert_eq!(decode_info_string(bytes), text);
        }
    }

    #[test]
    fn test_truncate_to_width() {
        let long = "A very long folder name that will not fit";
        let short = truncate_to_width(long, StandardFont::Helvetica, 12.0, 100.0);
        assert!(short.ends_with("..."));
        assert!(StandardFont::Helvetica.text_width(&short, 12.0) <= 100.0);
        assert_eq!(truncate_to_width("Gym", StandardFont::Helvetica, 12.0, 100.0), "Gym");
    }

    #[test]
    fn test_width_tables_are_complete() {
        assert_eq!(HELVETICA_WIDTHS.len(), 95);
        assert_eq!(HELVETICA_BOLD_WIDTHS.len(), 95);
        assert_eq!(StandardFont::Helvetica.glyph_width(b'~'), 584);
        assert_eq!(StandardFont::HelveticaBold.glyph_width(b'z'), 500);
    }
}
