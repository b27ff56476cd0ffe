//! Cell text normalization.
//!
//! Extracted text arrives with whatever whitespace the authoring tool left
//! behind: tab runs, mixed line endings, decomposed accents. Cells are
//! normalized once at extraction time so rendering is a pure projection.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse multiple whitespace characters into one.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

/// Text normalizer for extracted cell values.
#[derive(Debug, Clone)]
pub struct CellNormalizer {
    /// Whether to keep line breaks inside a cell.
    preserve_line_breaks: bool,
}

impl Default for CellNormalizer {
    fn default() -> Self {
        Self {
            preserve_line_breaks: true,
        }
    }
}

impl CellNormalizer {
    /// Create a new normalizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to preserve line breaks inside a cell.
    pub fn with_preserve_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    /// Normalize a single cell value.
    ///
    /// - Composes Unicode to NFC
    /// - Converts `\r\n` and `\r` to `\n`
    /// - Collapses horizontal whitespace runs to single spaces
    /// - Drops blank lines and trims each line
    pub fn normalize_cell(&self, text: &str) -> String {
        let composed: String = text.nfc().collect();
        let unified = composed.replace("\r\n", "\n").replace('\r', "\n");

        let lines: Vec<String> = unified
            .lines()
            .map(|line| WHITESPACE_COLLAPSE_REGEX.replace_all(line, " ").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        if self.preserve_line_breaks {
            lines.join("\n")
        } else {
            lines.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        let normalizer = CellNormalizer::new();
        assert_eq!(normalizer.normalize_cell("  Hello \t\t world  "), "Hello world");
        assert_eq!(normalizer.normalize_cell("a\u{00A0}\u{00A0}b"), "a b");
    }

    #[test]
    fn test_line_endings() {
        let normalizer = CellNormalizer::new();
        assert_eq!(normalizer.normalize_cell("one\r\ntwo\rthree"), "one\ntwo\nthree");
    }

    #[test]
    fn test_drop_blank_lines() {
        let normalizer = CellNormalizer::new();
        assert_eq!(normalizer.normalize_cell("one\n\n   \ntwo"), "one\ntwo");
        assert_eq!(normalizer.normalize_cell(" \n\t"), "");
    }

    #[test]
    fn test_join_lines_when_not_preserving() {
        let normalizer = CellNormalizer::new().with_preserve_line_breaks(false);
        assert_eq!(normalizer.normalize_cell("Siku 16\nza uanaharakati"), "Siku 16 za uanaharakati");
    }

    #[test]
    fn test_nfc_composition() {
        let normalizer = CellNormalizer::new();
        // "e" followed by a combining acute accent
        assert_eq!(normalizer.normalize_cell("caf\u{0065}\u{0301}"), "caf\u{00E9}");
    }
}
