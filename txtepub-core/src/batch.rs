//! Batch conversion on a worker pool
//!
//! Each file runs through its own pipeline. A failure or cancellation is
//! recorded in that file's [`FileReport`] and never stops the others.

use crate::boundary::HeadingTable;
use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Conversion, Converter};
use crate::progress::{CancellationToken, ProgressEvent, ProgressSink};
use crate::types::RawDocument;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One document to convert, optionally with its own configuration
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Input document
    pub document: RawDocument,
    /// Configuration overriding the processor's default
    pub config: Option<ConversionConfig>,
}

impl BatchJob {
    /// Job using the processor's default configuration
    pub fn new(document: RawDocument) -> Self {
        Self {
            document,
            config: None,
        }
    }

    /// Job with its own configuration
    pub fn with_config(document: RawDocument, config: ConversionConfig) -> Self {
        Self {
            document,
            config: Some(config),
        }
    }
}

impl From<RawDocument> for BatchJob {
    fn from(document: RawDocument) -> Self {
        Self::new(document)
    }
}

/// How one file ended
#[derive(Debug)]
pub enum FileOutcome {
    /// Chapters are ready
    Converted(Conversion),
    /// The file could not be converted
    Failed(Error),
    /// The batch was cancelled before the file finished
    Cancelled,
}

/// Outcome of one file, tagged with its source
#[derive(Debug)]
pub struct FileReport {
    /// Source identifier
    pub source: String,
    /// What happened
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Conversion result, if the file succeeded
    pub fn conversion(&self) -> Option<&Conversion> {
        match &self.outcome {
            FileOutcome::Converted(conversion) => Some(conversion),
            _ => None,
        }
    }

    /// Whether the file was converted
    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, FileOutcome::Converted(_))
    }
}

/// Per-file reports in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Reports, one per job
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Number of converted files
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Converted(_)))
    }

    /// Number of failed files
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    /// Number of cancelled files
    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Cancelled))
    }

    /// Whether every file was converted
    pub fn is_success(&self) -> bool {
        self.files.iter().all(FileReport::is_converted)
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }
}

/// Runs many conversions on a bounded pool of worker threads
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    converter: Arc<Converter>,
    table: Option<Arc<HeadingTable>>,
    threads: Option<usize>,
}

impl BatchProcessor {
    /// Processor converting with `converter` unless a job brings its own configuration
    pub fn new(converter: Converter) -> Self {
        Self {
            converter: Arc::new(converter),
            table: None,
            threads: None,
        }
    }

    /// Heading table used for jobs with their own configuration
    pub fn with_heading_table(mut self, table: Arc<HeadingTable>) -> Self {
        self.table = Some(table);
        self
    }

    /// Number of worker threads (None = one per CPU)
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Convert `documents` with the default configuration
    pub fn process(
        &self,
        documents: Vec<RawDocument>,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<BatchReport> {
        let jobs: Vec<BatchJob> = documents.into_iter().map(BatchJob::from).collect();
        self.process_jobs(&jobs, progress, cancel)
    }

    /// Convert each job, collecting reports in input order
    ///
    /// Only a worker pool that cannot be created is an error; everything
    /// that goes wrong with a single file ends up in its report.
    pub fn process_jobs(
        &self,
        jobs: &[BatchJob],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<BatchReport> {
        if self.threads == Some(0) {
            return Err(Error::Configuration(
                "threads must be greater than 0".into(),
            ));
        }

        log::info!("Converting {} files", jobs.len());
        let files = self.run_all(jobs, progress, cancel)?;
        let report = BatchReport { files };
        log::info!(
            "Batch finished: {} converted, {} failed, {} cancelled",
            report.converted(),
            report.failed(),
            report.cancelled()
        );
        Ok(report)
    }

    #[cfg(feature = "parallel")]
    fn run_all(
        &self,
        jobs: &[BatchJob],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileReport>> {
        let threads = self.threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("txtepub-worker-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        Ok(pool.install(|| {
            jobs.par_iter()
                .map(|job| self.run_one(job, progress, cancel))
                .collect()
        }))
    }

    #[cfg(not(feature = "parallel"))]
    fn run_all(
        &self,
        jobs: &[BatchJob],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<FileReport>> {
        Ok(jobs
            .iter()
            .map(|job| self.run_one(job, progress, cancel))
            .collect())
    }

    fn run_one(
        &self,
        job: &BatchJob,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> FileReport {
        let source = job.document.source().to_string();

        if cancel.is_cancelled() {
            progress.report(&ProgressEvent::Cancelled {
                source: source.clone(),
            });
            return FileReport {
                source,
                outcome: FileOutcome::Cancelled,
            };
        }

        let converter = match &job.config {
            None => Ok(Arc::clone(&self.converter)),
            Some(config) => self.converter_for(config.clone()),
        };

        let outcome = match converter {
            Err(e) => {
                log::warn!("{source}: {e}");
                progress.report(&ProgressEvent::Failed {
                    source: source.clone(),
                    error: e.to_string(),
                });
                FileOutcome::Failed(e)
            }
            Ok(converter) => match converter.convert_with(&job.document, progress, cancel) {
                Ok(conversion) => FileOutcome::Converted(conversion),
                Err(Error::Cancelled) => FileOutcome::Cancelled,
                Err(e) => {
                    log::warn!("{source}: {e}");
                    FileOutcome::Failed(e)
                }
            },
        };

        FileReport { source, outcome }
    }

    fn converter_for(&self, config: ConversionConfig) -> Result<Arc<Converter>> {
        let converter = match &self.table {
            Some(table) => Converter::with_heading_table(config, Arc::clone(table))?,
            None => Converter::new(config)?,
        };
        Ok(Arc::new(converter))
    }
}
