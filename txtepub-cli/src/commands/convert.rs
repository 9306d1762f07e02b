//! Convert command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use txtepub_core::{
    BatchProcessor, BookMetadata, CancellationToken, Conversion, ConversionConfig, FileOutcome,
    RawDocument,
};
use unicode_width::UnicodeWidthStr;

use super::{init_logging, DetectionArgs};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::OutputFormat;
use crate::progress::ProgressReporter;

/// Arguments for the convert command
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    #[command(flatten)]
    pub detection: DetectionArgs,

    /// Keep runs of blank lines as they are
    #[arg(long)]
    pub no_merge_blank_lines: bool,

    /// Keep leading and trailing whitespace of every line
    #[arg(long)]
    pub no_trim: bool,

    /// Collapse runs of spaces inside lines
    #[arg(long)]
    pub collapse_spaces: bool,

    /// Manifest format [default: text, or the config file's]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Directory for manifests (default: stdout)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Write each manifest next to its input file
    #[arg(long)]
    pub save_to_source: bool,

    /// Book author
    #[arg(long, value_name = "NAME")]
    pub author: Option<String>,

    /// Cover image passed along to the packager
    #[arg(long, value_name = "FILE")]
    pub cover: Option<PathBuf>,

    /// Book language tag [default: zh]
    #[arg(long, value_name = "TAG")]
    pub book_language: Option<String>,

    /// Number of worker threads (default: one per CPU)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// One line of the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Input path
    pub source: String,
    /// Where the manifest went
    pub output: String,
    /// Outcome
    pub status: String,
}

impl ConvertArgs {
    /// Execute the convert command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        log::info!("Starting conversion");
        log::debug!("Arguments: {:?}", self);

        let cli_config = CliConfig::load(self.config.as_deref())?;
        let config = self.conversion_config(&cli_config);
        let (converter, table) = self.detection.converter(config)?;
        let format = self.format.unwrap_or(cli_config.output.default_format);
        let metadata = self.metadata_template(&cli_config)?;

        let paths = resolve_patterns(&self.input)?;
        let (readable, unreadable) = read_inputs(&paths);
        let (indices, documents): (Vec<usize>, Vec<RawDocument>) = readable.into_iter().unzip();

        let threads = self.threads.or_else(|| cli_config.performance.threads());
        log::info!(
            "Converting {} files on {} threads",
            documents.len(),
            threads.unwrap_or_else(num_cpus::get)
        );
        let mut processor = BatchProcessor::new(converter).with_threads(threads);
        if let Some(table) = table {
            processor = processor.with_heading_table(table);
        }

        let mut reporter = ProgressReporter::new(self.quiet);
        reporter.init_files(documents.len() as u64);
        let report = processor
            .process(documents, &reporter, &CancellationToken::new())
            .context("Batch conversion failed")?;
        reporter.finish();
        log::debug!("{} files reported by the batch", reporter.position());

        let mut failed = unreadable.len();
        let mut rows = unreadable;

        for (&index, file) in indices.iter().zip(&report.files) {
            let path = &paths[index];
            let (output, status) = match &file.outcome {
                FileOutcome::Converted(conversion) => {
                    for warning in &conversion.warnings {
                        log::warn!("{}: {warning}", file.source);
                    }
                    match self.write_manifest(path, conversion, format, &metadata, &cli_config) {
                        Ok(output) => (
                            output,
                            format!("converted ({} chapters)", conversion.chapters.len()),
                        ),
                        Err(e) => {
                            log::error!("{}: {e:#}", file.source);
                            failed += 1;
                            ("-".to_string(), format!("failed: {e:#}"))
                        }
                    }
                }
                FileOutcome::Failed(e) => {
                    log::error!("{}: {e}", file.source);
                    failed += 1;
                    ("-".to_string(), format!("failed: {e}"))
                }
                FileOutcome::Cancelled => {
                    failed += 1;
                    ("-".to_string(), "cancelled".to_string())
                }
            };
            rows.push((
                index,
                SummaryRow {
                    source: file.source.clone(),
                    output,
                    status,
                },
            ));
        }

        rows.sort_by_key(|(index, _)| *index);
        let rows: Vec<SummaryRow> = rows.into_iter().map(|(_, row)| row).collect();
        eprint!("{}", summary_table(&rows));

        if failed > 0 {
            return Err(CliError::ConversionFailed {
                failed,
                total: paths.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Conversion settings: the config file's, overridden by flags
    pub fn conversion_config(&self, cli_config: &CliConfig) -> ConversionConfig {
        let mut config = cli_config.conversion.clone();
        self.detection.apply(&mut config);
        if self.no_merge_blank_lines {
            config.merge_blank_lines = false;
        }
        if self.no_trim {
            config.trim_whitespace = false;
        }
        if self.collapse_spaces {
            config.collapse_spaces = true;
        }
        config
    }

    /// Metadata shared by every book of the run; titles are filled in per file
    fn metadata_template(&self, cli_config: &CliConfig) -> Result<BookMetadata> {
        let mut metadata = BookMetadata::new("").with_language(
            self.book_language
                .as_deref()
                .unwrap_or(&cli_config.output.language),
        );
        if let Some(author) = self.author.as_ref().or(cli_config.output.author.as_ref()) {
            metadata = metadata.with_author(author.as_str());
        }
        if let Some(cover) = &self.cover {
            let bytes = FileReader::read_bytes(cover).context("Failed to load cover image")?;
            metadata = metadata.with_cover(bytes);
        }
        Ok(metadata)
    }

    /// Directory a manifest for `source` goes to, `None` meaning stdout
    fn output_dir(&self, source: &Path, cli_config: &CliConfig) -> Option<PathBuf> {
        let fallback = || {
            self.output
                .clone()
                .unwrap_or_else(|| cli_config.output.output_dir.clone())
        };

        if self.save_to_source {
            let parent = match source.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if is_writable(&parent) {
                return Some(parent);
            }
            let dir = fallback();
            log::warn!(
                "{} is not writable, writing to {} instead",
                parent.display(),
                dir.display()
            );
            return Some(dir);
        }

        self.output.clone()
    }

    fn write_manifest(
        &self,
        source: &Path,
        conversion: &Conversion,
        format: OutputFormat,
        template: &BookMetadata,
        cli_config: &CliConfig,
    ) -> Result<String> {
        let title = BookMetadata::from_source(&conversion.source).title;
        let metadata = BookMetadata {
            title,
            ..template.clone()
        };

        let Some(dir) = self.output_dir(source, cli_config) else {
            format
                .builder(io::stdout().lock())
                .build(&metadata, &conversion.chapters)?;
            return Ok("<stdout>".to_string());
        };

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        let path = dir.join(manifest_name(source, format));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        format
            .builder(BufWriter::new(file))
            .build(&metadata, &conversion.chapters)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {}", path.display());
        Ok(path.display().to_string())
    }
}

/// File name of the manifest for `source`
pub fn manifest_name(source: &Path, format: OutputFormat) -> String {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string());
    format!("{stem}.{}", format.extension())
}

/// Read every input, numbered by position
///
/// Files that cannot be read become failed summary rows instead of
/// stopping the run.
fn read_inputs(paths: &[PathBuf]) -> (Vec<(usize, RawDocument)>, Vec<(usize, SummaryRow)>) {
    let mut readable = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for (index, path) in paths.iter().enumerate() {
        match FileReader::read_document(path) {
            Ok(document) => readable.push((index, document)),
            Err(e) => {
                log::error!("{e:#}");
                unreadable.push((
                    index,
                    SummaryRow {
                        source: path.display().to_string(),
                        output: "-".to_string(),
                        status: format!("failed: {e:#}"),
                    },
                ));
            }
        }
    }
    (readable, unreadable)
}

/// Whether files can be created in `dir`
fn is_writable(dir: &Path) -> bool {
    let marker = dir.join(format!(".txtepub-write-check-{}", std::process::id()));
    match OpenOptions::new().write(true).create_new(true).open(&marker) {
        Ok(_) => {
            let _ = fs::remove_file(&marker);
            true
        }
        Err(_) => false,
    }
}

/// Render the summary as aligned columns
pub fn summary_table(rows: &[SummaryRow]) -> String {
    let headers = ["Source", "Output", "Status"];
    let source_width = column_width(rows, headers[0], |row| row.source.as_str());
    let output_width = column_width(rows, headers[1], |row| row.output.as_str());

    let mut table = String::new();
    let mut push_row = |source: &str, output: &str, status: &str| {
        table.push_str(&pad(source, source_width));
        table.push_str("  ");
        table.push_str(&pad(output, output_width));
        table.push_str("  ");
        table.push_str(status);
        table.push('\n');
    };
    push_row(headers[0], headers[1], headers[2]);
    for row in rows {
        push_row(&row.source, &row.output, &row.status);
    }
    table
}

fn column_width(rows: &[SummaryRow], header: &str, pick: fn(&SummaryRow) -> &str) -> usize {
    rows.iter()
        .map(|row| pick(row).width())
        .fold(header.width(), usize::max)
}

/// Pad to `width` terminal columns
fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(input: &str) -> ConvertArgs {
        ConvertArgs {
            input: vec![input.to_string()],
            detection: DetectionArgs::default(),
            no_merge_blank_lines: false,
            no_trim: false,
            collapse_spaces: false,
            format: None,
            output: None,
            save_to_source: false,
            author: None,
            cover: None,
            book_language: None,
            threads: None,
            config: None,
            quiet: true,
            verbose: 0,
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut cli_config = CliConfig::default();
        cli_config.conversion.collapse_spaces = false;

        let mut convert = args("a.txt");
        convert.no_merge_blank_lines = true;
        convert.no_trim = true;
        convert.collapse_spaces = true;
        convert.detection.pattern = Some("^Book".to_string());

        let config = convert.conversion_config(&cli_config);
        assert!(!config.merge_blank_lines);
        assert!(!config.trim_whitespace);
        assert!(config.collapse_spaces);
        assert!(!config.heuristic_mode);
        assert_eq!(config.pattern.as_deref(), Some("^Book"));
    }

    #[test]
    fn test_unset_flags_keep_config_file() {
        let mut cli_config = CliConfig::default();
        cli_config.conversion.merge_blank_lines = false;
        let config = args("a.txt").conversion_config(&cli_config);
        assert!(!config.merge_blank_lines);
        assert!(config.trim_whitespace);
    }

    #[test]
    fn test_manifest_name() {
        let source = Path::new("novels/三体.txt");
        assert_eq!(manifest_name(source, OutputFormat::Json), "三体.json");
        assert_eq!(manifest_name(source, OutputFormat::Text), "三体.chapters.txt");
        assert_eq!(manifest_name(source, OutputFormat::Markdown), "三体.md");
    }

    #[test]
    fn test_output_dir_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a.txt");
        let cli_config = CliConfig::default();

        let convert = args("a.txt");
        assert_eq!(convert.output_dir(&source, &cli_config), None);

        let mut convert = args("a.txt");
        convert.output = Some(PathBuf::from("out"));
        assert_eq!(
            convert.output_dir(&source, &cli_config),
            Some(PathBuf::from("out"))
        );

        convert.save_to_source = true;
        assert_eq!(
            convert.output_dir(&source, &cli_config),
            Some(temp_dir.path().to_path_buf())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_source_dir_falls_back() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores directory permissions
        if !is_writable(&locked) {
            let mut convert = args("a.txt");
            convert.save_to_source = true;
            let dir = convert.output_dir(&locked.join("a.txt"), &CliConfig::default());
            assert_eq!(dir, Some(PathBuf::from("epub_output")));
        }

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_write_check_leaves_no_file_behind() {
        let temp_dir = TempDir::new().unwrap();
        assert!(is_writable(temp_dir.path()));
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_summary_table_alignment() {
        let rows = vec![
            SummaryRow {
                source: "长篇.txt".to_string(),
                output: "out/长篇.json".to_string(),
                status: "converted (3 chapters)".to_string(),
            },
            SummaryRow {
                source: "b.txt".to_string(),
                output: "-".to_string(),
                status: "cancelled".to_string(),
            },
        ];
        let table = summary_table(&rows);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "Source    Output         Status");
        assert_eq!(lines[1], "长篇.txt  out/长篇.json  converted (3 chapters)");
        assert_eq!(lines[2], "b.txt     -              cancelled");
        // Status starts in the same terminal column on every line
        for line in &lines {
            let (before, _) = line.rsplit_once("  ").unwrap();
            assert_eq!(before.width() + 2, 25);
        }
    }

    #[test]
    fn test_unreadable_inputs_become_failed_rows() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.txt");
        fs::write(&good, "Chapter 1\nHello\n").unwrap();
        let missing = temp_dir.path().join("missing.txt");

        let paths = vec![missing.clone(), good.clone()];
        let (readable, unreadable) = read_inputs(&paths);

        assert_eq!(readable.len(), 1);
        assert_eq!(readable[0].0, 1);
        assert!(readable[0].1.source().ends_with("good.txt"));

        assert_eq!(unreadable.len(), 1);
        let (index, row) = &unreadable[0];
        assert_eq!(*index, 0);
        assert_eq!(row.source, missing.display().to_string());
        assert_eq!(row.output, "-");
        assert!(row.status.starts_with("failed: Failed to read file"));
    }

    #[test]
    fn test_metadata_template_prefers_flags() {
        let mut cli_config = CliConfig::default();
        cli_config.output.author = Some("Config Author".to_string());

        let mut convert = args("a.txt");
        let metadata = convert.metadata_template(&cli_config).unwrap();
        assert_eq!(metadata.author.as_deref(), Some("Config Author"));
        assert_eq!(metadata.language, "zh");

        convert.author = Some("Flag Author".to_string());
        convert.book_language = Some("en".to_string());
        let metadata = convert.metadata_template(&cli_config).unwrap();
        assert_eq!(metadata.author.as_deref(), Some("Flag Author"));
        assert_eq!(metadata.language, "en");
    }
}
