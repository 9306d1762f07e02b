//! Encoding detection and chapter segmentation for plain-text ebooks
//!
//! This crate turns raw text files of unknown encoding into an ordered set
//! of titled chapters that an ebook container builder can package. It
//! handles English and Chinese heading conventions out of the box and lets
//! the caller replace the heuristics with a single custom pattern.
//!
//! # Architecture
//!
//! The pipeline runs in fixed stages, each a stateless value:
//! - **Encoding**: BOM sniffing, statistical detection, CJK script ratio
//!   and a permissive fallback ([`encoding::EncodingDetector`])
//! - **Normalization**: optional blank-line and whitespace cleanup
//!   ([`normalize::Normalizer`])
//! - **Boundary detection**: an ordered heading table or a custom regex
//!   ([`boundary`])
//! - **Segmentation**: a gap-free partition of the text into chapters
//!   ([`segment::Segmenter`])
//!
//! [`pipeline::Converter`] wires the stages together for one document and
//! [`batch::BatchProcessor`] runs many documents on a worker pool.
//!
//! # Example
//!
//! ```rust
//! use txtepub_core::{ConversionConfig, Converter, RawDocument};
//!
//! let converter = Converter::new(ConversionConfig::default()).unwrap();
//! let raw = RawDocument::new("book.txt", b"Chapter 1\nHello\nChapter 2\nWorld".to_vec());
//! let conversion = converter.convert(&raw).unwrap();
//!
//! let titles: Vec<_> = conversion.chapters.entries().map(|e| e.title).collect();
//! assert_eq!(titles, ["Chapter 1", "Chapter 2"]);
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod boundary;
pub mod config;
pub mod container;
pub mod encoding;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod preview;
pub mod progress;
pub mod segment;
pub mod types;

pub use batch::{BatchJob, BatchProcessor, BatchReport, FileOutcome, FileReport};
pub use boundary::{
    BoundaryDetector, DetectionMode, HeadingTable, HeuristicDetector, PatternDetector,
};
pub use config::{ConversionConfig, ConversionConfigBuilder, HeuristicOptions};
pub use container::{BookMetadata, ContainerBuilder};
pub use encoding::{DetectionStage, EncodingDetector, EncodingOptions};
pub use error::{Error, Result, Warning};
pub use normalize::{NormalizeOptions, Normalizer};
pub use pipeline::{Conversion, Converter};
pub use preview::{ChapterSummary, Preview, PreviewLine, PreviewProjector};
pub use progress::{CancellationToken, NoProgress, ProgressEvent, ProgressSink};
pub use segment::Segmenter;
pub use types::{
    BoundaryCandidate, Chapter, ChapterEntry, ChapterSet, DecodedDocument, PatternClass,
    RawDocument,
};
