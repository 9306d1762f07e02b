//! Whitespace and blank-line cleanup
//!
//! Normalization runs once over the whole document before boundary
//! detection. Every offset produced downstream refers to its output.

use serde::{Deserialize, Serialize};

/// Independent normalization toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Merge runs of blank lines into a single blank line
    pub merge_blank_lines: bool,
    /// Trim leading and trailing whitespace on every line
    pub trim_whitespace: bool,
    /// Collapse runs of horizontal whitespace inside a line to one space
    pub collapse_spaces: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            merge_blank_lines: true,
            trim_whitespace: true,
            collapse_spaces: false,
        }
    }
}

impl NormalizeOptions {
    /// Options with every transform disabled
    pub fn none() -> Self {
        Self {
            merge_blank_lines: false,
            trim_whitespace: false,
            collapse_spaces: false,
        }
    }

    fn is_identity(&self) -> bool {
        !self.merge_blank_lines && !self.trim_whitespace && !self.collapse_spaces
    }
}

/// Applies [`NormalizeOptions`] to a document
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    /// Create a normalizer
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Toggles in use
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Produce the normalized text
    ///
    /// Blank lines are merged first, then each remaining line is trimmed
    /// and collapsed. Line terminators are kept as they are.
    pub fn normalize(&self, text: &str) -> String {
        if self.options.is_identity() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut previous_blank = false;

        for line in text.split_inclusive('\n') {
            let (content, terminator) = split_terminator(line);
            let blank = content.trim().is_empty();

            if self.options.merge_blank_lines && blank && previous_blank {
                continue;
            }
            previous_blank = blank;

            let content = if self.options.trim_whitespace {
                content.trim()
            } else {
                content
            };
            if self.options.collapse_spaces {
                push_collapsed(content, &mut out);
            } else {
                out.push_str(content);
            }
            out.push_str(terminator);
        }

        out
    }
}

/// Split a line into its content and its `\n` or `\r\n` terminator
pub(crate) fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

fn is_horizontal_space(c: char) -> bool {
    c.is_whitespace() && c != '\n' && c != '\r'
}

fn push_collapsed(content: &str, out: &mut String) {
    let mut in_run = false;
    for c in content.chars() {
        if is_horizontal_space(c) {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
}
