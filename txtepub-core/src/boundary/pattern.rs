use super::{dedup_candidates, truncate_chars, BoundaryDetector};
use crate::config::defaults::MAX_TITLE_CHARS;
use crate::error::{Error, Result};
use crate::progress::CancellationToken;
use crate::types::{BoundaryCandidate, PatternClass};
use regex::{Regex, RegexBuilder};

/// Upper bound for the compiled pattern
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Heading detection with a caller-supplied regex
///
/// The pattern is compiled in multi-line mode, so `^` and `$` anchor at
/// line boundaries. Every match start becomes a candidate.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    regex: Regex,
    max_title_chars: usize,
}

impl PatternDetector {
    /// Compile `pattern`, rejecting empty and malformed patterns
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(Error::invalid_pattern(pattern, "pattern cannot be empty"));
        }
        let regex = RegexBuilder::new(pattern)
            .multi_line(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|e| Error::invalid_pattern(pattern, e))?;
        Ok(Self {
            regex,
            max_title_chars: MAX_TITLE_CHARS,
        })
    }

    /// Cut titles to `max_chars` characters
    pub fn with_max_title_chars(mut self, max_chars: usize) -> Self {
        self.max_title_chars = max_chars;
        self
    }

    /// Pattern as supplied
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl BoundaryDetector for PatternDetector {
    fn detect(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<BoundaryCandidate>> {
        let mut candidates = Vec::new();
        for m in self.regex.find_iter(text) {
            cancel.check()?;

            let offset = m.start();
            let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
            let line_end = text[offset..]
                .find('\n')
                .map_or(text.len(), |i| offset + i + 1);

            let matched = m.as_str().trim();
            let heading = if matched.is_empty() {
                text[line_start..line_end].trim()
            } else {
                matched
            };

            candidates.push(BoundaryCandidate {
                offset,
                pattern_class: PatternClass::Custom,
                heading_text: truncate_chars(heading, self.max_title_chars),
                heading_end: line_end,
            });
        }

        log::debug!(
            "Pattern `{}` matched {} times",
            self.regex.as_str(),
            candidates.len()
        );
        Ok(dedup_candidates(candidates))
    }
}
