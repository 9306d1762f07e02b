//! Ordered heading table
//!
//! Heading conventions are data: a list of rules parsed from TOML and
//! compiled once. The built-in table ships inside the crate, callers can
//! load a replacement from a file.

use crate::error::{Error, Result};
use crate::types::PatternClass;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// TOML source of the built-in table
pub const BUILTIN_HEADINGS: &str = include_str!("../../configs/headings.toml");

const DEFAULT_TAIL_RATIO: f64 = 0.95;

static BUILTIN_TABLE: OnceLock<std::result::Result<Arc<HeadingTable>, String>> = OnceLock::new();

/// On-disk form of a heading table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingTableConfig {
    /// Loose rules never match past this fraction of the text
    #[serde(default = "default_tail_ratio")]
    pub tail_ratio: f64,
    /// Regexes that reject a match from a loose or flagged rule
    #[serde(default)]
    pub disqualify: Vec<String>,
    /// Rules in priority order
    #[serde(default)]
    pub rules: Vec<HeadingRuleConfig>,
}

/// On-disk form of one rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingRuleConfig {
    /// Heading class reported for matches
    pub class: PatternClass,
    /// Regex matched against the trimmed line
    pub pattern: String,
    /// Human-readable examples
    #[serde(default)]
    pub description: Option<String>,
    /// Regex removed from the start of the title
    #[serde(default)]
    pub strip: Option<String>,
    /// Length cap for this rule
    #[serde(default)]
    pub max_chars: Option<usize>,
    /// Require blank lines around the heading
    #[serde(default)]
    pub isolated: bool,
    /// Apply the table-level disqualifiers
    #[serde(default)]
    pub disqualify: bool,
    /// Apply the table-level disqualifiers and tail ratio
    #[serde(default)]
    pub loose: bool,
}

fn default_tail_ratio() -> f64 {
    DEFAULT_TAIL_RATIO
}

/// A compiled heading rule
#[derive(Debug, Clone)]
pub struct HeadingRule {
    class: PatternClass,
    pattern: Regex,
    description: Option<String>,
    strip: Option<Regex>,
    max_chars: Option<usize>,
    isolated: bool,
    disqualify: bool,
    loose: bool,
}

impl HeadingRule {
    /// Heading class
    pub fn class(&self) -> PatternClass {
        self.class
    }

    /// Matching regex
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Human-readable examples
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether blank lines must surround the heading
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    /// Whether the table-level disqualifiers reject matches
    pub fn is_disqualifiable(&self) -> bool {
        self.disqualify || self.loose
    }

    /// Whether this is a low-specificity rule
    pub fn is_loose(&self) -> bool {
        self.loose
    }

    fn matches_text(&self, trimmed: &str) -> bool {
        if let Some(limit) = self.max_chars {
            if trimmed.chars().count() > limit {
                return false;
            }
        }
        self.pattern.is_match(trimmed)
    }

    /// Title for a matched line, with the strip prefix removed
    ///
    /// Falls back to the whole line when stripping leaves nothing.
    pub fn title<'a>(&self, trimmed: &'a str) -> &'a str {
        let Some(strip) = &self.strip else {
            return trimmed;
        };
        let stripped = match strip.find(trimmed) {
            Some(m) if m.start() == 0 => trimmed[m.end()..].trim(),
            _ => trimmed,
        };
        if stripped.is_empty() {
            trimmed
        } else {
            stripped
        }
    }
}

/// Where a line sits in the document, for rules that care
#[derive(Debug, Clone, Copy)]
pub struct LineContext {
    /// Blank line or document edge on both sides
    pub isolated: bool,
    /// Offset of the line divided by the text length
    pub position: f64,
}

/// Ordered, compiled heading rules
#[derive(Debug, Clone)]
pub struct HeadingTable {
    rules: Vec<HeadingRule>,
    disqualify: Vec<Regex>,
    tail_ratio: f64,
}

impl HeadingTable {
    /// Built-in table, parsed on first use
    pub fn builtin() -> Result<Arc<HeadingTable>> {
        BUILTIN_TABLE
            .get_or_init(|| {
                HeadingTable::from_toml_str(BUILTIN_HEADINGS)
                    .map(Arc::new)
                    .map_err(|e| e.to_string())
            })
            .clone()
            .map_err(Error::HeadingTable)
    }

    /// Parse and compile a table from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: HeadingTableConfig = toml::from_str(content)
            .map_err(|e| Error::HeadingTable(format!("Failed to parse heading table: {e}")))?;
        Self::from_config(config)
    }

    /// Load a table from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::HeadingTable(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate and compile a parsed table
    pub fn from_config(config: HeadingTableConfig) -> Result<Self> {
        if config.rules.is_empty() {
            return Err(Error::HeadingTable(
                "heading table must contain at least one rule".to_string(),
            ));
        }
        if !(config.tail_ratio > 0.0 && config.tail_ratio <= 1.0) {
            return Err(Error::HeadingTable(format!(
                "tail_ratio must be in (0, 1], got {}",
                config.tail_ratio
            )));
        }

        let disqualify = config
            .disqualify
            .iter()
            .map(|pattern| compile(pattern, "disqualify"))
            .collect::<Result<Vec<_>>>()?;

        let mut rules = Vec::with_capacity(config.rules.len());
        for (index, rule) in config.rules.into_iter().enumerate() {
            if rule.class.is_synthetic() {
                return Err(Error::HeadingTable(format!(
                    "rule {index}: class `{}` is reserved",
                    rule.class
                )));
            }
            if rule.max_chars == Some(0) {
                return Err(Error::HeadingTable(format!(
                    "rule {index}: max_chars must be greater than 0"
                )));
            }
            let context = format!("rule {index} ({})", rule.class);
            rules.push(HeadingRule {
                class: rule.class,
                pattern: compile(&rule.pattern, &context)?,
                description: rule.description,
                strip: rule
                    .strip
                    .as_deref()
                    .map(|s| compile(s, &context))
                    .transpose()?,
                max_chars: rule.max_chars,
                isolated: rule.isolated,
                disqualify: rule.disqualify,
                loose: rule.loose,
            });
        }

        Ok(Self {
            rules,
            disqualify,
            tail_ratio: config.tail_ratio,
        })
    }

    /// Rules in priority order
    pub fn rules(&self) -> &[HeadingRule] {
        &self.rules
    }

    /// Classes covered by the table, in rule order
    pub fn classes(&self) -> Vec<PatternClass> {
        let mut classes: Vec<PatternClass> = Vec::new();
        for rule in &self.rules {
            if !classes.contains(&rule.class) {
                classes.push(rule.class);
            }
        }
        classes
    }

    /// Fraction of the text after which loose rules stop matching
    pub fn tail_ratio(&self) -> f64 {
        self.tail_ratio
    }

    /// Whether a disqualifier matches the line
    pub fn is_disqualified(&self, trimmed: &str) -> bool {
        self.disqualify.iter().any(|re| re.is_match(trimmed))
    }

    /// First rule that matches a trimmed line
    pub fn match_line(&self, trimmed: &str, context: LineContext) -> Option<&HeadingRule> {
        self.rules.iter().find(|rule| {
            if rule.isolated && !context.isolated {
                return false;
            }
            if rule.loose && context.position > self.tail_ratio {
                return false;
            }
            if rule.is_disqualifiable() && self.is_disqualified(trimmed) {
                return false;
            }
            rule.matches_text(trimmed)
        })
    }
}

fn compile(pattern: &str, context: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::HeadingTable(format!("{context}: invalid regex `{pattern}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDGE: LineContext = LineContext {
        isolated: false,
        position: 0.0,
    };
    const ISOLATED: LineContext = LineContext {
        isolated: true,
        position: 0.1,
    };

    fn class_of(line: &str, context: LineContext) -> Option<PatternClass> {
        HeadingTable::builtin()
            .unwrap()
            .match_line(line, context)
            .map(|rule| rule.class())
    }

    #[test]
    fn test_builtin_table_covers_every_heading_class() {
        let table = HeadingTable::builtin().unwrap();
        let classes = table.classes();
        for class in [
            PatternClass::EnglishNumbered,
            PatternClass::EnglishVolume,
            PatternClass::EnglishMatter,
            PatternClass::ChineseNumbered,
            PatternClass::ChineseVolume,
            PatternClass::ChineseMatter,
            PatternClass::MarkdownHeading,
            PatternClass::UppercaseLine,
            PatternClass::ShortIsolatedLine,
        ] {
            assert!(classes.contains(&class), "missing {class}");
        }
        assert_eq!(table.tail_ratio(), 0.95);
    }

    #[test]
    fn test_builtin_table_is_shared() {
        let first = HeadingTable::builtin().unwrap();
        let second = HeadingTable::builtin().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_english_headings() {
        assert_eq!(class_of("Chapter 1", EDGE), Some(PatternClass::EnglishNumbered));
        assert_eq!(class_of("CHAPTER IV", EDGE), Some(PatternClass::EnglishNumbered));
        assert_eq!(class_of("Ch. 12: The Road", EDGE), Some(PatternClass::EnglishNumbered));
        assert_eq!(class_of("Chapter Twenty-One", EDGE), Some(PatternClass::EnglishNumbered));
        assert_eq!(class_of("Part 2", EDGE), Some(PatternClass::EnglishVolume));
        assert_eq!(class_of("Book One", EDGE), Some(PatternClass::EnglishVolume));
        assert_eq!(class_of("Prologue", EDGE), Some(PatternClass::EnglishMatter));
        assert_eq!(class_of("Chapters are long", EDGE), None);
        assert_eq!(class_of("Chapter XLII", EDGE), Some(PatternClass::EnglishNumbered));
        assert_eq!(class_of("Chapter mcmxc", EDGE), Some(PatternClass::EnglishNumbered));
        assert_eq!(class_of("Volume III", EDGE), Some(PatternClass::EnglishVolume));
        // Words spelled with numeral letters
        assert_eq!(class_of("Chapter did not matter to him", EDGE), None);
        assert_eq!(class_of("Chapter mild", EDGE), None);
        assert_eq!(class_of("Chapter civil", EDGE), None);
        assert_eq!(class_of("Chapter vivid", EDGE), None);
        assert_eq!(class_of("Book clm", EDGE), None);
        assert_eq!(class_of("Chapter tenderly", EDGE), None);
    }

    #[test]
    fn test_chinese_headings() {
        assert_eq!(class_of("第一章 开始", EDGE), Some(PatternClass::ChineseNumbered));
        assert_eq!(class_of("第12回", EDGE), Some(PatternClass::ChineseNumbered));
        assert_eq!(class_of("第 三 节", EDGE), Some(PatternClass::ChineseNumbered));
        assert_eq!(class_of("第一卷 风起", EDGE), Some(PatternClass::ChineseVolume));
        assert_eq!(class_of("卷三", EDGE), Some(PatternClass::ChineseVolume));
        assert_eq!(class_of("楔子", EDGE), Some(PatternClass::ChineseMatter));
        assert_eq!(class_of("番外一 旧事", EDGE), Some(PatternClass::ChineseMatter));
        assert_eq!(class_of("前言不搭后语地说了一通", EDGE), None);
    }

    #[test]
    fn test_markdown_heading_title_strips_markers() {
        let table = HeadingTable::builtin().unwrap();
        let rule = table.match_line("## The Beginning", EDGE).unwrap();
        assert_eq!(rule.class(), PatternClass::MarkdownHeading);
        assert_eq!(rule.title("## The Beginning"), "The Beginning");
    }

    #[test]
    fn test_loose_rules_need_isolation() {
        assert_eq!(class_of("THE LONG WINTER", EDGE), None);
        assert_eq!(class_of("THE LONG WINTER", ISOLATED), Some(PatternClass::UppercaseLine));
        assert_eq!(class_of("Interlude", ISOLATED), Some(PatternClass::ShortIsolatedLine));
        assert_eq!(class_of("Interlude", EDGE), None);
    }

    #[test]
    fn test_loose_rules_disqualified() {
        // Dialogue punctuation
        assert_eq!(class_of("“走吧。”", ISOLATED), None);
        // Past the tail ratio
        let tail = LineContext {
            isolated: true,
            position: 0.99,
        };
        assert_eq!(class_of("Interlude", tail), None);
        // Specific rules ignore the tail ratio
        assert_eq!(class_of("Epilogue", tail), Some(PatternClass::EnglishMatter));
    }

    #[test]
    fn test_sentences_are_not_specific_headings() {
        assert_eq!(class_of("第一章写得真好，他说。", EDGE), None);
        assert_eq!(class_of("第三章“归来”", EDGE), None);
        assert_eq!(class_of("Chapter 3 began with “Hello”", EDGE), None);
        assert_eq!(class_of("Prologue (draft)", EDGE), None);
        assert_eq!(class_of("第一章 开始", EDGE), Some(PatternClass::ChineseNumbered));
    }

    #[test]
    fn test_disqualify_flag_is_per_rule() {
        let table = HeadingTable::from_toml_str(
            r#"
            disqualify = ['。']

            [[rules]]
            class = "chinese_numbered"
            pattern = '^第.章'
            disqualify = true

            [[rules]]
            class = "chinese_volume"
            pattern = '^第.卷'
            "#,
        )
        .unwrap();
        assert!(table.rules()[0].is_disqualifiable());
        assert!(!table.rules()[1].is_disqualifiable());
        assert!(table.match_line("第一章完。", EDGE).is_none());
        let rule = table.match_line("第一卷完。", EDGE).unwrap();
        assert_eq!(rule.class(), PatternClass::ChineseVolume);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let table = HeadingTable::from_toml_str(
            r#"
            [[rules]]
            class = "english_matter"
            pattern = '^Intro'

            [[rules]]
            class = "short_isolated_line"
            pattern = '^.+$'
            "#,
        )
        .unwrap();
        let rule = table.match_line("Intro", EDGE).unwrap();
        assert_eq!(rule.class(), PatternClass::EnglishMatter);
    }

    #[test]
    fn test_validation_errors() {
        let empty = HeadingTable::from_toml_str("tail_ratio = 0.9");
        assert!(matches!(empty, Err(Error::HeadingTable(_))));

        let bad_regex = HeadingTable::from_toml_str(
            r#"
            [[rules]]
            class = "english_numbered"
            pattern = '(unclosed'
            "#,
        );
        assert!(matches!(bad_regex, Err(Error::HeadingTable(msg)) if msg.contains("invalid regex")));

        let reserved = HeadingTable::from_toml_str(
            r#"
            [[rules]]
            class = "preamble"
            pattern = '^x'
            "#,
        );
        assert!(matches!(reserved, Err(Error::HeadingTable(msg)) if msg.contains("reserved")));

        let ratio = HeadingTable::from_toml_str(
            r#"
            tail_ratio = 1.5
            [[rules]]
            class = "english_numbered"
            pattern = '^x'
            "#,
        );
        assert!(matches!(ratio, Err(Error::HeadingTable(msg)) if msg.contains("tail_ratio")));

        let unknown_class = HeadingTable::from_toml_str(
            r#"
            [[rules]]
            class = "klingon"
            pattern = '^x'
            "#,
        );
        assert!(matches!(unknown_class, Err(Error::HeadingTable(_))));
    }
}
