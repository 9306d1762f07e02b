use super::table::{HeadingTable, LineContext};
use super::{dedup_candidates, lines, truncate_chars, BoundaryDetector, Line};
use crate::config::HeuristicOptions;
use crate::error::Result;
use crate::progress::CancellationToken;
use crate::types::BoundaryCandidate;
use std::sync::Arc;

/// Heading detection driven by an ordered [`HeadingTable`]
///
/// Each non-blank line is tried against the rules in order and the first
/// match wins. A match then has to pass the length guard and the
/// proximity guard from [`HeuristicOptions`].
#[derive(Debug, Clone)]
pub struct HeuristicDetector {
    table: Arc<HeadingTable>,
    options: HeuristicOptions,
}

impl HeuristicDetector {
    /// Detector over the built-in heading table
    pub fn new(options: HeuristicOptions) -> Result<Self> {
        Ok(Self::with_table(HeadingTable::builtin()?, options))
    }

    /// Detector over a caller-supplied table
    pub fn with_table(table: Arc<HeadingTable>, options: HeuristicOptions) -> Self {
        Self { table, options }
    }

    /// Heading table in use
    pub fn table(&self) -> &HeadingTable {
        &self.table
    }

    /// Guard thresholds in use
    pub fn options(&self) -> &HeuristicOptions {
        &self.options
    }
}

impl BoundaryDetector for HeuristicDetector {
    fn detect(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<BoundaryCandidate>> {
        let all_lines: Vec<Line<'_>> = lines(text).collect();
        let text_len = text.len().max(1) as f64;

        let mut candidates = Vec::new();
        let mut last_accepted: Option<usize> = None;
        let mut body_since_last = false;

        for (i, line) in all_lines.iter().enumerate() {
            cancel.check()?;
            if line.is_blank() {
                continue;
            }

            let trimmed = line.content.trim();
            let context = LineContext {
                isolated: is_isolated(&all_lines, i),
                position: line.start as f64 / text_len,
            };
            let Some(rule) = self.table.match_line(trimmed, context) else {
                body_since_last = true;
                continue;
            };

            if trimmed.chars().count() > self.options.max_heading_chars {
                log::trace!("Length guard rejected line at {}", line.start);
                body_since_last = true;
                continue;
            }

            if let Some(previous) = last_accepted {
                let distance = text[previous..line.start].chars().count();
                if !body_since_last && distance < self.options.proximity_chars {
                    log::trace!(
                        "Proximity guard rejected line at {} ({distance} chars after {previous})",
                        line.start
                    );
                    continue;
                }
            }

            candidates.push(BoundaryCandidate {
                offset: line.start,
                pattern_class: rule.class(),
                heading_text: truncate_chars(rule.title(trimmed), self.options.max_title_chars),
                heading_end: line.end,
            });
            last_accepted = Some(line.start);
            body_since_last = false;
        }

        log::debug!("Heuristic scan found {} heading candidates", candidates.len());
        Ok(dedup_candidates(candidates))
    }
}

fn is_isolated(all_lines: &[Line<'_>], index: usize) -> bool {
    let above = index == 0 || all_lines[index - 1].is_blank();
    let below = index + 1 >= all_lines.len() || all_lines[index + 1].is_blank();
    above && below
}
