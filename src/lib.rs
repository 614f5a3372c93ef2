//! Citation cleanup for research reports.
//!
//! `citenorm` keeps the inline numeric citations of a Markdown report and its
//! trailing reference section consistent with each other.
//!
//! # Key Features
//!
//! - **Validation**: orphan citations, references never cited, references that
//!   point at the same URL, and reference numbers defined twice.
//! - **Renumbering**: citations are renumbered `1..K` in order of first
//!   appearance in the body and the reference section is rebuilt to match.
//! - **Deduplication**: references sharing a canonical URL share a number.
//! - **URL cleanup**: tracking parameters (`utm_*`, `fbclid`, `gclid`, ...) are
//!   stripped from reference URLs.
//!
//! # Document Format
//!
//! ```plain
//! Rust avoids data races at compile time [3]. See also [7].
//!
//! ## References
//! [3] Fearless Concurrency — https://doc.rust-lang.org/book/ch16-00-concurrency.html
//! [7] The Rustonomicon — https://doc.rust-lang.org/nomicon/?utm_source=feed
//! ```
//!
//! Reference entries are `[number] title — url` lines (em-dash separator)
//! following a `## References` heading. Any other second-level heading ends the
//! reference section.
//!
//! # Basic Usage
//!
//! ```rust
//! let report = "Fast [3] and safe [7].\n\n## References\n[3] Speed — https://a.com/\n[7] Safety — https://b.com/?utm_source=feed\n";
//!
//! assert!(citenorm::validate(report).is_empty());
//!
//! let formatted = citenorm::renumber(report);
//! assert_eq!(
//!     formatted,
//!     "Fast [1] and safe [2].\n\n## References\n[1] Speed — https://a.com/\n[2] Safety — https://b.com/?\n"
//! );
//! ```
//!
//! # Configuration
//!
//! ```rust
//! use citenorm::{Formatter, FormatterConfig};
//!
//! let mut config = FormatterConfig {
//!     references_heading: "Sources".to_string(),
//!     ..Default::default()
//! };
//! config.tracking_params.remove("ref");
//!
//! let formatter = Formatter::new().with_config(config);
//! let warnings = formatter.validate("Cited [1].\n\n## Sources\n[1] A — https://a.com/?ref=x\n");
//! assert!(warnings.is_empty());
//! ```
//!
//! # Error Handling
//!
//! Formatting and validation never fail: a document without a reference
//! section is returned unchanged by [`renumber`] and every citation in it is
//! reported by [`validate`]. Only the file and converter helpers in [`files`]
//! return [`Result`], with [`FormatError`] describing what went wrong.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

pub mod canonical;
mod citations;
pub mod files;
mod number;
pub mod references;
mod regex;
pub mod renumber;
mod sections;
pub mod validate;

// Reexports
pub use canonical::TrackingParams;
pub use files::PdfExporter;
pub use number::CitationNumber;
pub use references::{ReferenceEntry, ReferenceList};
pub use renumber::Renumbering;
pub use validate::Diagnostic;

/// A specialized Result type for file and converter operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors from the I/O collaborators around the formatting engine.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} not found", .0.display())]
    MissingInput(PathBuf),

    #[error("{program} not found. Install it to export PDFs.")]
    ConverterUnavailable { program: String },

    #[error("{program} failed: {status}")]
    ConverterFailed { program: String, status: ExitStatus },
}

/// Settings shared by every formatting and validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Text of the second-level heading that opens the reference section.
    pub references_heading: String,
    /// Query parameters stripped from reference URLs.
    pub tracking_params: TrackingParams,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            references_heading: "References".to_string(),
            tracking_params: TrackingParams::default(),
        }
    }
}

/// Validates and renumbers the citations of report documents.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: FormatterConfig,
}

impl Formatter {
    /// Creates a formatter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: FormatterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Strips tracking parameters from `url`.
    pub fn canonicalize(&self, url: &str) -> String {
        canonical::canonicalize_with(url, &self.config.tracking_params)
    }

    /// Parses the reference entries of `text`.
    pub fn parse_references(&self, text: &str) -> ReferenceList {
        ReferenceList::parse(text, &self.config)
    }

    /// Distinct inline citation numbers of `text`, ascending by value.
    ///
    /// Markers inside reference sections are not counted.
    pub fn find_inline_citations(&self, text: &str) -> Vec<CitationNumber> {
        citations::inline_citations(text, &self.config.references_heading)
            .into_iter()
            .collect()
    }

    /// Plans the renumbering of `text` without rewriting it. `None` when the
    /// document has no references.
    pub fn plan(&self, text: &str) -> Option<Renumbering> {
        renumber::plan(text, &self.config).map(|(_, renumbering)| renumbering)
    }

    /// Renumbers citations by first appearance and rebuilds the reference section.
    ///
    /// Renumbering an already renumbered document returns it unchanged.
    pub fn renumber(&self, text: &str) -> String {
        renumber::renumber(text, &self.config)
    }

    /// Reports citation/reference inconsistencies without modifying anything.
    pub fn validate(&self, text: &str) -> Vec<Diagnostic> {
        validate::validate(text, &self.config)
    }
}

/// Strips the default tracking parameters from `url`.
pub fn canonicalize(url: &str) -> String {
    Formatter::new().canonicalize(url)
}

/// Parses the reference section of `text` with the default configuration.
pub fn parse_references(text: &str) -> ReferenceList {
    Formatter::new().parse_references(text)
}

/// Inline citation numbers of `text` with the default configuration.
pub fn find_inline_citations(text: &str) -> Vec<CitationNumber> {
    Formatter::new().find_inline_citations(text)
}

/// Renumbers `text` with the default configuration.
pub fn renumber(text: &str) -> String {
    Formatter::new().renumber(text)
}

/// Validates `text` with the default configuration.
pub fn validate(text: &str) -> Vec<Diagnostic> {
    Formatter::new().validate(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const REPORT: &str = r#"# Deep research: memory safety

Ownership prevents use-after-free [12]. The borrow checker is described in
[4], and data races are covered in [12] and [9].
Some claims remain unsourced [15].

## References
[4] The Book: References and Borrowing — https://doc.rust-lang.org/book/ch04-02-references-and-borrowing.html?utm_source=chatgpt.com
[9] Fearless Concurrency — https://doc.rust-lang.org/book/ch16-00-concurrency.html
[12] Understanding Ownership — https://doc.rust-lang.org/book/ch04-00-understanding-ownership.html
[21] Ownership mirror — https://doc.rust-lang.org/book/ch04-00-understanding-ownership.html?fbclid=xyz
[30] Unused source — https://example.com/unused

## Methodology
Sources were collected on 2025-01-01.
"#;

    fn numbers(list: &[CitationNumber]) -> Vec<&str> {
        list.iter().map(CitationNumber::as_str).collect()
    }

    #[test]
    fn test_format_error_display() {
        let error = FormatError::ConverterUnavailable {
            program: "pandoc".to_string(),
        };
        assert_eq!(error.to_string(), "pandoc not found. Install it to export PDFs.");
    }

    #[test]
    fn test_tracking_param_stripping() {
        assert_eq!(canonicalize("https://x.com/a?utm_source=foo&id=5"), "https://x.com/a?id=5");
        assert_eq!(canonicalize("https://x.com/a?utm_source=foo"), "https://x.com/a?");
    }

    #[test]
    fn test_find_inline_citations() {
        assert_eq!(numbers(&find_inline_citations(REPORT)), vec!["4", "9", "12", "15"]);
    }

    #[test]
    fn test_validate_before_format() {
        let warnings: Vec<String> = validate(REPORT).iter().map(ToString::to_string).collect();
        assert_eq!(
            warnings,
            vec![
                "Citation [15] has no matching reference",
                "Reference [21] is never cited in the text",
                "Reference [30] is never cited in the text",
                "Duplicate URL: [12] and [21] point to https://doc.rust-lang.org/book/ch04-00-understanding-ownership.html",
            ]
        );
    }

    #[test]
    fn test_format_then_validate() {
        let formatted = renumber(REPORT);
        let expected = r#"# Deep research: memory safety

Ownership prevents use-after-free [1]. The borrow checker is described in
[2], and data races are covered in [1] and [3].
Some claims remain unsourced [15].

## References
[1] Understanding Ownership — https://doc.rust-lang.org/book/ch04-00-understanding-ownership.html
[2] The Book: References and Borrowing — https://doc.rust-lang.org/book/ch04-02-references-and-borrowing.html?
[3] Fearless Concurrency — https://doc.rust-lang.org/book/ch16-00-concurrency.html

## Methodology
Sources were collected on 2025-01-01.
"#;
        assert_eq!(formatted, expected);

        // The orphan survives formatting; the uncited [30] is gone, so the
        // post-format check no longer mentions it.
        let warnings: Vec<String> = validate(&formatted).iter().map(ToString::to_string).collect();
        assert_eq!(warnings, vec!["Citation [15] has no matching reference"]);
    }

    #[test]
    fn test_renumber_properties() {
        let formatted = renumber(REPORT);
        assert_eq!(renumber(&formatted), formatted);

        let refs = parse_references(&formatted);
        let found: Vec<_> = refs.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(found, vec!["1", "2", "3"]);

        let plan = Formatter::new().plan(REPORT).unwrap();
        let mapping: HashMap<&str, &str> = plan
            .mapping()
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
            .collect();
        assert_eq!(mapping.get("12"), Some(&"1"));
        assert_eq!(mapping.get("4"), Some(&"2"));
        assert_eq!(mapping.get("9"), Some(&"3"));
        assert_eq!(mapping.get("15"), None);
        assert_eq!(mapping.get("30"), None);
    }

    #[test]
    fn test_plan_without_references() {
        assert_eq!(Formatter::new().plan("Nothing cited [1]."), None);
    }

    #[test]
    fn test_custom_heading() {
        let config = FormatterConfig {
            references_heading: "Sources".to_string(),
            ..Default::default()
        };
        let formatter = Formatter::new().with_config(config);
        let text = "Cited [5].\n\n## Sources\n[5] A — https://a.com/\n";
        assert_eq!(
            formatter.renumber(text),
            "Cited [1].\n\n## Sources\n[1] A — https://a.com/\n"
        );
        // With the default heading the section is not found.
        assert_eq!(renumber(text), text);
    }
}
