//! Byte-order mark sniffing and Unicode decoding

use encoding_rs::{UTF_16BE, UTF_16LE};

/// UTF-8 BOM: EF BB BF
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
/// UTF-16 LE BOM: FF FE
pub const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
/// UTF-16 BE BOM: FE FF
pub const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
/// UTF-32 LE BOM: FF FE 00 00
pub const UTF32_LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
/// UTF-32 BE BOM: 00 00 FE FF
pub const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Unicode encoding announced by a byte-order mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bom {
    /// UTF-8
    Utf8,
    /// UTF-16 little endian
    Utf16Le,
    /// UTF-16 big endian
    Utf16Be,
    /// UTF-32 little endian
    Utf32Le,
    /// UTF-32 big endian
    Utf32Be,
}

impl Bom {
    /// Encoding label reported for this BOM
    pub fn label(&self) -> &'static str {
        match self {
            Bom::Utf8 => "UTF-8",
            Bom::Utf16Le => "UTF-16LE",
            Bom::Utf16Be => "UTF-16BE",
            Bom::Utf32Le => "UTF-32LE",
            Bom::Utf32Be => "UTF-32BE",
        }
    }

    /// Length of the mark in bytes
    pub fn len(&self) -> usize {
        match self {
            Bom::Utf8 => UTF8_BOM.len(),
            Bom::Utf16Le | Bom::Utf16Be => 2,
            Bom::Utf32Le | Bom::Utf32Be => 4,
        }
    }

    /// Decode `buffer`, which must start with this BOM
    pub fn decode(&self, buffer: &[u8]) -> String {
        let data = &buffer[self.len().min(buffer.len())..];
        match self {
            Bom::Utf8 => String::from_utf8_lossy(data).into_owned(),
            Bom::Utf16Le => UTF_16LE.decode_without_bom_handling(data).0.into_owned(),
            Bom::Utf16Be => UTF_16BE.decode_without_bom_handling(data).0.into_owned(),
            Bom::Utf32Le => decode_utf32(data, u32::from_le_bytes),
            Bom::Utf32Be => decode_utf32(data, u32::from_be_bytes),
        }
    }
}

/// Detect a byte-order mark at the start of `buffer`
pub fn sniff(buffer: &[u8]) -> Option<Bom> {
    // UTF-32 LE starts with the UTF-16 LE mark, so it goes first
    if buffer.starts_with(UTF32_LE_BOM) {
        Some(Bom::Utf32Le)
    } else if buffer.starts_with(UTF32_BE_BOM) {
        Some(Bom::Utf32Be)
    } else if buffer.starts_with(UTF8_BOM) {
        Some(Bom::Utf8)
    } else if buffer.starts_with(UTF16_LE_BOM) {
        Some(Bom::Utf16Le)
    } else if buffer.starts_with(UTF16_BE_BOM) {
        Some(Bom::Utf16Be)
    } else {
        None
    }
}

/// Guess BOM-less UTF-16 from the distribution of zero bytes
///
/// ASCII-heavy UTF-16 text has a zero in every other byte.
pub fn sniff_utf16_without_bom(buffer: &[u8]) -> Option<Bom> {
    let total_pairs = buffer.len() / 2;
    if total_pairs <= 4 {
        return None;
    }

    let nulls_at_odd = buffer.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    let nulls_at_even = buffer.iter().step_by(2).filter(|&&b| b == 0).count();

    if nulls_at_odd > total_pairs * 3 / 4 && nulls_at_even < total_pairs / 4 {
        return Some(Bom::Utf16Le);
    }
    if nulls_at_even > total_pairs * 3 / 4 && nulls_at_odd < total_pairs / 4 {
        return Some(Bom::Utf16Be);
    }
    None
}

/// Decode BOM-less UTF-16 data
pub fn decode_utf16(data: &[u8], bom: Bom) -> String {
    match bom {
        Bom::Utf16Be => UTF_16BE.decode_without_bom_handling(data).0.into_owned(),
        _ => UTF_16LE.decode_without_bom_handling(data).0.into_owned(),
    }
}

fn decode_utf32(data: &[u8], read: fn([u8; 4]) -> u32) -> String {
    let mut result = String::with_capacity(data.len() / 4);
    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        let codepoint = read([chunk[0], chunk[1], chunk[2], chunk[3]]);
        result.push(char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    if !chunks.remainder().is_empty() {
        result.push(char::REPLACEMENT_CHARACTER);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_prefers_utf32_over_utf16() {
        assert_eq!(sniff(&[0xFF, 0xFE, 0x00, 0x00, b'H', 0, 0, 0]), Some(Bom::Utf32Le));
        assert_eq!(sniff(&[0xFF, 0xFE, b'H', 0x00]), Some(Bom::Utf16Le));
        assert_eq!(sniff(&[0x00, 0x00, 0xFE, 0xFF]), Some(Bom::Utf32Be));
        assert_eq!(sniff(&[0xFE, 0xFF, 0x00, b'H']), Some(Bom::Utf16Be));
        assert_eq!(sniff(&[0xEF, 0xBB, 0xBF, b'x']), Some(Bom::Utf8));
        assert_eq!(sniff(b"plain"), None);
        assert_eq!(sniff(&[]), None);
    }

    #[test]
    fn test_decode_strips_mark() {
        let utf32: Vec<u8> = vec![0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00, b'A', 0x00, 0x00, 0x00, b'B'];
        assert_eq!(Bom::Utf32Be.decode(&utf32), "AB");

        let utf16: Vec<u8> = vec![0xFF, 0xFE, b'H', 0x00, b'i', 0x00];
        assert_eq!(Bom::Utf16Le.decode(&utf16), "Hi");
    }

    #[test]
    fn test_utf32_invalid_scalar_and_tail_are_replaced() {
        let mut data = vec![0xFF, 0xFE, 0x00, 0x00];
        data.extend_from_slice(&0x0011_0000u32.to_le_bytes());
        data.extend_from_slice(&[b'x', 0x00]);
        assert_eq!(Bom::Utf32Le.decode(&data), "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_utf16_without_bom() {
        let le: Vec<u8> = "Hello World".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        assert_eq!(sniff_utf16_without_bom(&le), Some(Bom::Utf16Le));
        assert_eq!(decode_utf16(&le, Bom::Utf16Le), "Hello World");

        let be: Vec<u8> = "Hello World".encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        assert_eq!(sniff_utf16_without_bom(&be), Some(Bom::Utf16Be));

        assert_eq!(sniff_utf16_without_bom(b"Hello World"), None);
    }
}
