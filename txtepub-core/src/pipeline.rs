//! Single-document conversion pipeline

use crate::boundary::{
    BoundaryDetector, DetectionMode, HeadingTable, HeuristicDetector, PatternDetector,
};
use crate::config::ConversionConfig;
use crate::encoding::EncodingDetector;
use crate::error::{Error, Result, Warning};
use crate::normalize::Normalizer;
use crate::preview::{Preview, PreviewProjector, DEFAULT_LINE_COUNT};
use crate::progress::{CancellationToken, NoProgress, ProgressEvent, ProgressSink};
use crate::segment::Segmenter;
use crate::types::{ChapterSet, DecodedDocument, RawDocument};
use std::sync::Arc;

/// Result of converting one document
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Source identifier of the input
    pub source: String,
    /// Chapters ready for a container builder
    pub chapters: ChapterSet,
    /// Non-fatal conditions met along the way
    pub warnings: Vec<Warning>,
}

/// Runs decode, normalize, detect and segment for one document at a time
///
/// A converter is immutable once built and can be shared by many threads.
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConversionConfig,
    decoder: EncodingDetector,
    normalizer: Normalizer,
    detector: DetectionMode,
    segmenter: Segmenter,
}

impl Converter {
    /// Validate `config` and build a converter over the built-in heading table
    pub fn new(config: ConversionConfig) -> Result<Self> {
        config.validate()?;
        let table = if config.heuristic_mode {
            Some(HeadingTable::builtin()?)
        } else {
            None
        };
        Self::build(config, table)
    }

    /// Validate `config` and build a converter over a caller-supplied table
    ///
    /// The table is ignored in custom-pattern mode.
    pub fn with_heading_table(config: ConversionConfig, table: Arc<HeadingTable>) -> Result<Self> {
        config.validate()?;
        Self::build(config, Some(table))
    }

    fn build(config: ConversionConfig, table: Option<Arc<HeadingTable>>) -> Result<Self> {
        let detector = match (config.heuristic_mode, table) {
            (true, Some(table)) => {
                DetectionMode::Heuristic(HeuristicDetector::with_table(table, config.heuristics))
            }
            (true, None) => DetectionMode::Heuristic(HeuristicDetector::new(config.heuristics)?),
            (false, _) => {
                let pattern = config.pattern.as_deref().unwrap_or_default();
                DetectionMode::Pattern(
                    PatternDetector::new(pattern)?
                        .with_max_title_chars(config.heuristics.max_title_chars),
                )
            }
        };

        Ok(Self {
            decoder: EncodingDetector::new(config.encoding),
            normalizer: Normalizer::new(config.normalize_options()),
            detector,
            segmenter: Segmenter::new(),
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Boundary detector in use
    pub fn detector(&self) -> &DetectionMode {
        &self.detector
    }

    /// Decode raw bytes with the configured thresholds
    pub fn decode(&self, raw: &RawDocument) -> DecodedDocument {
        self.decoder.detect(raw.bytes())
    }

    /// Convert one document without progress reporting or cancellation
    pub fn convert(&self, raw: &RawDocument) -> Result<Conversion> {
        self.convert_with(raw, &NoProgress, &CancellationToken::new())
    }

    /// Convert one document, reporting to `progress` and honoring `cancel`
    pub fn convert_with(
        &self,
        raw: &RawDocument,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Conversion> {
        let source = raw.source().to_string();
        progress.report(&ProgressEvent::Started {
            source: source.clone(),
            bytes: raw.len(),
        });

        match self.run(raw, progress, cancel) {
            Ok(conversion) => {
                progress.report(&ProgressEvent::Segmented {
                    source,
                    chapters: conversion.chapters.len(),
                });
                Ok(conversion)
            }
            Err(Error::Cancelled) => {
                log::debug!("Conversion of {source} cancelled");
                progress.report(&ProgressEvent::Cancelled { source });
                Err(Error::Cancelled)
            }
            Err(e) => {
                progress.report(&ProgressEvent::Failed {
                    source,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn run(
        &self,
        raw: &RawDocument,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Conversion> {
        cancel.check()?;
        let mut warnings = Vec::new();

        let document = Arc::new(self.decode(raw));
        progress.report(&ProgressEvent::Decoded {
            source: raw.source().to_string(),
            encoding: document.encoding.clone(),
            confidence: document.confidence,
        });
        if self.decoder.is_low_confidence(document.confidence) {
            warnings.push(Warning::LowConfidenceEncoding {
                encoding: document.encoding.clone(),
                confidence: document.confidence,
                threshold: self.config.encoding.low_confidence_threshold,
            });
        }

        let (chapters, candidates) = self.segment(document, cancel)?;
        progress.report(&ProgressEvent::BoundariesDetected {
            source: raw.source().to_string(),
            candidates,
        });

        if chapters.is_empty() {
            warnings.push(Warning::EmptyDocument);
        } else if candidates == 0 && self.detector.is_heuristic() {
            warnings.push(Warning::NoChapterFound);
        }

        log::debug!(
            "{}: {} chapters from {} candidates, encoding {}",
            raw.source(),
            chapters.len(),
            candidates,
            chapters.document().encoding
        );

        Ok(Conversion {
            source: raw.source().to_string(),
            chapters,
            warnings,
        })
    }

    /// Normalize, detect and segment an already decoded document
    ///
    /// Returns the chapters and the number of boundary candidates found.
    pub fn segment(
        &self,
        document: Arc<DecodedDocument>,
        cancel: &CancellationToken,
    ) -> Result<(ChapterSet, usize)> {
        let text = self.normalizer.normalize(&document.text);
        let candidates = self.detector.detect(&text, cancel)?;
        let count = candidates.len();
        Ok((self.segmenter.segment(document, text, &candidates), count))
    }

    /// Preview of a document: first lines, encoding and detected chapters
    pub fn preview(&self, raw: &RawDocument) -> Result<Preview> {
        let document = Arc::new(self.decode(raw));
        let (chapters, _) = self.segment(Arc::clone(&document), &CancellationToken::new())?;
        let projector = PreviewProjector::new(
            self.config.preview_line_count.unwrap_or(DEFAULT_LINE_COUNT),
        )
        .with_warn_threshold(self.config.encoding.low_confidence_threshold);
        Ok(projector.project(&document, Some(&chapters)))
    }
}
