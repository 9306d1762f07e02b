//! End-to-end tests for single-document conversion

use std::io::Write;
use std::sync::Arc;
use txtepub_core::{
    ConversionConfig, Converter, DetectionStage, Error, HeadingTable, PatternClass, RawDocument,
    Warning,
};

fn convert(text: &str) -> txtepub_core::Conversion {
    let converter = Converter::new(ConversionConfig::default()).unwrap();
    converter
        .convert(&RawDocument::new("book.txt", text.as_bytes().to_vec()))
        .unwrap()
}

#[test]
fn test_english_chapters_with_bodies() {
    let conversion = convert("Chapter 1\nHello\nChapter 2\nWorld");
    let entries: Vec<_> = conversion
        .chapters
        .entries()
        .map(|e| (e.title, e.body))
        .collect();

    assert_eq!(
        entries,
        vec![("Chapter 1", "Hello\n"), ("Chapter 2", "World")]
    );
    assert!(conversion.warnings.is_empty());
}

#[test]
fn test_chinese_chapters() {
    let conversion = convert("第一章 开始\n内容\n第二章 发展\n内容2");
    assert_eq!(conversion.chapters.titles(), vec!["第一章 开始", "第二章 发展"]);
    assert!(conversion
        .chapters
        .chapters()
        .iter()
        .all(|c| c.class == PatternClass::ChineseNumbered));
}

#[test]
fn test_no_heading_is_one_chapter_with_warning() {
    let text = "It was the best of times, it was the worst of times.\nIt was the age of wisdom.\n";
    let conversion = convert(text);
    let chapters = conversion.chapters.chapters();

    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].body_start, 0);
    assert_eq!(chapters[0].body_end, conversion.chapters.text().len());
    assert!(conversion.warnings.contains(&Warning::NoChapterFound));
}

#[test]
fn test_prose_line_starting_like_a_heading_is_body() {
    let conversion = convert("他翻开书。\n第一章写得真好，他说。\n后面还有很多内容。\n");
    assert_eq!(conversion.chapters.chapters().len(), 1);
    assert!(conversion.warnings.contains(&Warning::NoChapterFound));

    let conversion = convert("Some intro line here.\nChapter did not matter to him.\nMore body text follows here.\n");
    assert_eq!(conversion.chapters.chapters().len(), 1);
    assert!(conversion.warnings.contains(&Warning::NoChapterFound));
}

#[test]
fn test_gbk_bytes_detected_as_gbk() {
    let text = "第一章 风起\n天地玄黄，宇宙洪荒。日月盈昃，辰宿列张。寒来暑往，秋收冬藏。\n\
                第二章 云涌\n闰余成岁，律吕调阳。云腾致雨，露结为霜。金生丽水，玉出昆冈。\n";
    let (bytes, _, had_errors) = encoding_rs::GBK.encode(text);
    assert!(!had_errors);
    assert!(std::str::from_utf8(&bytes).is_err());

    let converter = Converter::new(ConversionConfig::default()).unwrap();
    let conversion = converter
        .convert(&RawDocument::new("gbk.txt", bytes.into_owned()))
        .unwrap();

    let document = conversion.chapters.document();
    assert_eq!(document.encoding, "GBK");
    assert!(document.confidence > 0.3);
    assert_eq!(conversion.chapters.titles(), vec!["第一章 风起", "第二章 云涌"]);
}

#[test]
fn test_malformed_pattern_fails_before_scanning() {
    let result = Converter::new(ConversionConfig::with_pattern("(unclosed"));
    match result {
        Err(Error::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn test_bom_is_removed_from_text() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("Chapter 1\nHello".as_bytes());
    let converter = Converter::new(ConversionConfig::default()).unwrap();
    let conversion = converter
        .convert(&RawDocument::new("bom.txt", bytes))
        .unwrap();

    let document = conversion.chapters.document();
    assert_eq!(document.stage, DetectionStage::Bom);
    assert_eq!(document.confidence, 1.0);
    assert!(!document.text.starts_with('\u{FEFF}'));
    assert_eq!(conversion.chapters.titles(), vec!["Chapter 1"]);
}

#[test]
fn test_utf16_bom_document() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "第一章\n正文".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let converter = Converter::new(ConversionConfig::default()).unwrap();
    let conversion = converter
        .convert(&RawDocument::new("utf16.txt", bytes))
        .unwrap();
    assert_eq!(conversion.chapters.document().encoding, "UTF-16LE");
    assert_eq!(conversion.chapters.titles(), vec!["第一章"]);
}

#[test]
fn test_low_confidence_warning() {
    // Random high bytes are neither UTF-8 nor a plausible legacy encoding
    let bytes: Vec<u8> = (0..512u32).map(|i| (0x80 + (i * 37) % 0x7F) as u8).collect();
    let converter = Converter::new(ConversionConfig::default()).unwrap();
    let conversion = converter
        .convert(&RawDocument::new("noise.bin", bytes))
        .unwrap();

    let confidence = conversion.chapters.document().confidence;
    assert!((0.0..=1.0).contains(&confidence));
    if confidence < 0.5 {
        assert!(conversion
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::LowConfidenceEncoding { .. })));
    }
}

#[test]
fn test_normalization_toggles_affect_offsets() {
    let text = "  Chapter 1  \n\n\n\nHello\n";
    let trimmed = convert(text);
    assert_eq!(trimmed.chapters.text(), "Chapter 1\n\nHello\n");

    let config = ConversionConfig::builder()
        .merge_blank_lines(false)
        .trim_whitespace(false)
        .build()
        .unwrap();
    let converter = Converter::new(config).unwrap();
    let raw = converter
        .convert(&RawDocument::new("raw.txt", text.as_bytes().to_vec()))
        .unwrap();
    assert_eq!(raw.chapters.text(), text);
    assert_eq!(raw.chapters.titles(), vec!["Chapter 1"]);
}

#[test]
fn test_preamble_and_matter() {
    let text = "Copyright notice\nAll rights reserved.\n\nPrologue\nlong ago\n\nChapter 1\nthe start\n";
    let conversion = convert(text);
    assert_eq!(
        conversion.chapters.titles(),
        vec!["Preamble", "Prologue", "Chapter 1"]
    );
    assert_eq!(conversion.chapters.chapters()[0].class, PatternClass::Preamble);
}

#[test]
fn test_heading_table_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[rules]]
class = "english_numbered"
pattern = '^Lesson \d+'
"#
    )
    .unwrap();

    let table = HeadingTable::from_file(file.path()).unwrap();
    let converter =
        Converter::with_heading_table(ConversionConfig::default(), Arc::new(table)).unwrap();
    let conversion = converter
        .convert(&RawDocument::new(
            "lessons.txt",
            b"Lesson 1\nalpha\nChapter 2\nbeta\nLesson 2\ngamma".to_vec(),
        ))
        .unwrap();
    assert_eq!(conversion.chapters.titles(), vec!["Lesson 1", "Lesson 2"]);
}

#[test]
fn test_missing_heading_table_file() {
    let result = HeadingTable::from_file("/nonexistent/headings.toml");
    assert!(matches!(result, Err(Error::HeadingTable(_))));
}
