//! CJK script-ratio scoring

/// Check if a single character belongs to a Chinese script range
#[inline]
pub fn is_cjk_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code) || // CJK Unified Ideographs
    (0x3400..=0x4DBF).contains(&code) || // CJK Extension A
    (0xF900..=0xFAFF).contains(&code) || // CJK Compatibility Ideographs
    (0x3000..=0x303F).contains(&code) || // CJK Symbols and Punctuation
    (0xFF00..=0xFFEF).contains(&code) // Halfwidth and Fullwidth Forms
}

/// Share of non-whitespace characters that are CJK
///
/// Returns 0.0 for text without any non-whitespace character.
pub fn cjk_ratio(text: &str) -> f32 {
    let mut total = 0usize;
    let mut cjk = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if is_cjk_char(c) {
            cjk += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    cjk as f32 / total as f32
}

/// Share of characters that are U+FFFD replacement characters
pub fn replacement_ratio(text: &str) -> f32 {
    let mut total = 0usize;
    let mut replaced = 0usize;
    for c in text.chars() {
        total += 1;
        if c == char::REPLACEMENT_CHARACTER {
            replaced += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    replaced as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_ratio() {
        assert_eq!(cjk_ratio("第一章"), 1.0);
        assert_eq!(cjk_ratio("ab"), 0.0);
        assert_eq!(cjk_ratio("中a"), 0.5);
        assert_eq!(cjk_ratio("  \n "), 0.0);
        // Full-width punctuation counts
        assert_eq!(cjk_ratio("你好。"), 1.0);
    }

    #[test]
    fn test_replacement_ratio() {
        assert_eq!(replacement_ratio(""), 0.0);
        assert_eq!(replacement_ratio("abcd"), 0.0);
        assert_eq!(replacement_ratio("ab\u{FFFD}\u{FFFD}"), 0.5);
    }
}
