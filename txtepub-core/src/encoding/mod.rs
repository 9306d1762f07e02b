//! Character encoding detection
//!
//! Turns a byte buffer of unknown encoding into text. Detection runs in
//! priority order and the first conclusive step wins:
//! 1. BOM (Byte Order Mark) - UTF-8, UTF-16 and UTF-32
//! 2. Statistical detection via chardetng
//! 3. CJK script ratio over strict decodes of UTF-8, GBK, GB2312 and Big5
//! 4. Replacement-tolerant decodes of UTF-8, GBK and windows-1252
//! 5. Lossy UTF-8 with zero confidence
//!
//! Detection never fails: undecodable input still yields text.

pub mod bom;
pub mod script;

use crate::error::{Error, Result};
use crate::types::DecodedDocument;
use chardetng::EncodingDetector as StatisticalDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidates for the script-ratio step, in tie-breaking order
const SCRIPT_CANDIDATES: &[&str] = &["utf-8", "gbk", "gb2312", "big5"];

/// Encodings tried by the replacement-tolerant fallback, in order
const FALLBACK_CANDIDATES: &[&str] = &["utf-8", "gbk", "windows-1252"];

/// Base score for a guess chardetng is confident about
const CONFIDENT_GUESS: f32 = 0.9;
/// Base score for a guess chardetng is unsure about
const UNSURE_GUESS: f32 = 0.5;
/// Score for BOM-less UTF-16 recognized by zero-byte layout
const UTF16_LAYOUT_CONFIDENCE: f32 = 0.8;
/// Score for valid UTF-8 without a CJK majority
const CLEAN_UTF8_CONFIDENCE: f32 = 0.8;
/// Ceiling for results of the fallback list
const FALLBACK_CONFIDENCE: f32 = 0.4;

/// Detection step that produced a [`DecodedDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStage {
    /// Byte-order mark
    Bom,
    /// Statistical classifier
    Statistical,
    /// CJK script ratio
    ScriptRatio,
    /// Replacement-tolerant fallback list
    Fallback,
    /// Lossy UTF-8
    LastResort,
}

impl fmt::Display for DetectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectionStage::Bom => "byte-order mark",
            DetectionStage::Statistical => "statistical",
            DetectionStage::ScriptRatio => "script ratio",
            DetectionStage::Fallback => "fallback",
            DetectionStage::LastResort => "last resort",
        };
        f.write_str(name)
    }
}

/// Tunable thresholds for encoding detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingOptions {
    /// Minimum score for accepting a statistical guess
    pub statistical_threshold: f32,
    /// Minimum CJK share for accepting a script-ratio candidate
    pub min_cjk_ratio: f32,
    /// Maximum replacement share for accepting a fallback decode
    pub fallback_error_tolerance: f32,
    /// Confidence below which callers get a low-confidence warning
    pub low_confidence_threshold: f32,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            statistical_threshold: 0.7,
            min_cjk_ratio: 0.3,
            fallback_error_tolerance: 0.001,
            low_confidence_threshold: 0.5,
        }
    }
}

impl EncodingOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        let unit = [
            ("statistical_threshold", self.statistical_threshold),
            ("min_cjk_ratio", self.min_cjk_ratio),
            ("fallback_error_tolerance", self.fallback_error_tolerance),
            ("low_confidence_threshold", self.low_confidence_threshold),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Configuration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.fallback_error_tolerance <= 0.0 {
            return Err(Error::Configuration(
                "fallback_error_tolerance must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Stateless encoding detector
#[derive(Debug, Clone, Default)]
pub struct EncodingDetector {
    options: EncodingOptions,
}

impl EncodingDetector {
    /// Create a detector with the given thresholds
    pub fn new(options: EncodingOptions) -> Self {
        Self { options }
    }

    /// Thresholds in use
    pub fn options(&self) -> &EncodingOptions {
        &self.options
    }

    /// Whether a confidence value should be reported as low
    pub fn is_low_confidence(&self, confidence: f32) -> bool {
        confidence < self.options.low_confidence_threshold
    }

    /// Decode `buffer`, detecting its encoding
    pub fn detect(&self, buffer: &[u8]) -> DecodedDocument {
        let decoded = self
            .try_bom(buffer)
            .or_else(|| self.try_statistics(buffer))
            .or_else(|| self.try_script_ratio(buffer))
            .or_else(|| self.try_fallback_list(buffer))
            .unwrap_or_else(|| last_resort(buffer));

        log::debug!(
            "Detected {} ({:.2}) via {}",
            decoded.encoding,
            decoded.confidence,
            decoded.stage
        );
        decoded
    }

    fn try_bom(&self, buffer: &[u8]) -> Option<DecodedDocument> {
        let bom = bom::sniff(buffer)?;
        Some(DecodedDocument::new(
            bom.decode(buffer),
            bom.label(),
            1.0,
            DetectionStage::Bom,
        ))
    }

    fn try_statistics(&self, buffer: &[u8]) -> Option<DecodedDocument> {
        if buffer.is_ascii() {
            // Includes the empty buffer
            let text = String::from_utf8_lossy(buffer).into_owned();
            return Some(DecodedDocument::new(
                text,
                UTF_8.name(),
                1.0,
                DetectionStage::Statistical,
            ));
        }

        if let Some(layout) = bom::sniff_utf16_without_bom(buffer) {
            if UTF16_LAYOUT_CONFIDENCE > self.options.statistical_threshold {
                return Some(DecodedDocument::new(
                    bom::decode_utf16(buffer, layout),
                    layout.label(),
                    UTF16_LAYOUT_CONFIDENCE,
                    DetectionStage::Statistical,
                ));
            }
        }

        let mut detector = StatisticalDetector::new();
        detector.feed(buffer, true);
        let (encoding, confident) = detector.guess_assess(None, true);

        let (text, _) = encoding.decode_without_bom_handling(buffer);
        let base = if confident {
            CONFIDENT_GUESS
        } else {
            UNSURE_GUESS
        };
        let score = base * (1.0 - script::replacement_ratio(&text));
        log::trace!(
            "chardetng guessed {} (confident: {confident}, score {score:.2})",
            encoding.name()
        );

        (score > self.options.statistical_threshold).then(|| {
            DecodedDocument::new(
                text.into_owned(),
                encoding.name(),
                score,
                DetectionStage::Statistical,
            )
        })
    }

    fn try_script_ratio(&self, buffer: &[u8]) -> Option<DecodedDocument> {
        let mut best: Option<(&'static Encoding, String, f32)> = None;
        let mut clean_utf8: Option<String> = None;

        for label in SCRIPT_CANDIDATES {
            let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
                continue;
            };
            let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(buffer)
            else {
                continue;
            };
            let ratio = script::cjk_ratio(&text);
            log::trace!("Strict {} decode: CJK ratio {ratio:.2}", encoding.name());

            if encoding == UTF_8 && clean_utf8.is_none() {
                clean_utf8 = Some(text.clone().into_owned());
            }
            if best.as_ref().map_or(true, |(_, _, r)| ratio > *r) {
                best = Some((encoding, text.into_owned(), ratio));
            }
        }

        if let Some((encoding, text, ratio)) = best {
            if ratio >= self.options.min_cjk_ratio && ratio > 0.0 {
                return Some(DecodedDocument::new(
                    text,
                    encoding.name(),
                    ratio,
                    DetectionStage::ScriptRatio,
                ));
            }
        }

        clean_utf8.map(|text| {
            DecodedDocument::new(
                text,
                UTF_8.name(),
                CLEAN_UTF8_CONFIDENCE,
                DetectionStage::ScriptRatio,
            )
        })
    }

    fn try_fallback_list(&self, buffer: &[u8]) -> Option<DecodedDocument> {
        let tolerance = self.options.fallback_error_tolerance;

        FALLBACK_CANDIDATES.iter().find_map(|label| {
            let encoding = Encoding::for_label(label.as_bytes())?;
            let (text, _) = encoding.decode_without_bom_handling(buffer);
            let ratio = script::replacement_ratio(&text);
            if ratio > tolerance {
                return None;
            }
            let confidence = FALLBACK_CONFIDENCE * (1.0 - ratio / tolerance);
            Some(DecodedDocument::new(
                text.into_owned(),
                encoding.name(),
                confidence,
                DetectionStage::Fallback,
            ))
        })
    }
}

fn last_resort(buffer: &[u8]) -> DecodedDocument {
    DecodedDocument::new(
        String::from_utf8_lossy(buffer).into_owned(),
        UTF_8.name(),
        0.0,
        DetectionStage::LastResort,
    )
}
