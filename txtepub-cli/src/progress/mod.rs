//! Progress reporting module

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use txtepub_core::{ProgressEvent, ProgressSink};

/// Progress bar over the files of a batch
///
/// Plugged into the batch driver as its [`ProgressSink`]; the bar advances
/// once per file, on that file's last event.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// Initialize progress bar for file processing
    pub fn init_files(&mut self, total_files: u64) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total_files);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    /// Number of files reported finished so far
    pub fn position(&self) -> u64 {
        self.progress_bar.as_ref().map_or(0, ProgressBar::position)
    }

    /// Finish progress reporting
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("Complete");
        }
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, event: &ProgressEvent) {
        let Some(pb) = &self.progress_bar else {
            return;
        };

        let name = file_name(event.source());
        match event {
            ProgressEvent::Decoded { encoding, .. } => {
                pb.set_message(format!("{name} ({encoding})"));
            }
            ProgressEvent::Segmented { chapters, .. } => {
                pb.set_message(format!("{name}: {chapters} chapters"));
            }
            ProgressEvent::Failed { .. } => pb.set_message(format!("{name}: failed")),
            ProgressEvent::Cancelled { .. } => pb.set_message(format!("{name}: cancelled")),
            ProgressEvent::Started { .. } | ProgressEvent::BoundariesDetected { .. } => {}
        }
        if event.is_terminal() {
            pb.inc(1);
        }
    }
}

fn file_name(source: &str) -> String {
    Path::new(source)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}
