//! Reference section parsing.
//!
//! Entries are lines of the reference section in the form
//!
//! ```plain
//! [3] Some article title — https://example.com/article
//! ```
//!
//! where the separator is an em-dash and the URL runs to the next whitespace.
//! Only lines inside the reference section are considered; a reference-shaped
//! line in the body is ordinary text.

use crate::canonical::canonicalize_with;
use crate::number::CitationNumber;
use crate::regex::Regex;
use crate::sections::{LineKind, Lines, Section};
use crate::FormatterConfig;
use either::{Left, Right};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static REFERENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([0-9]+)\]\s+(.+?)\s*—\s*(https?://\S+)").unwrap());

/// A single reference entry with its URL already canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub number: CitationNumber,
    pub title: String,
    pub url: String,
}

impl fmt::Display for ReferenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} — {}", self.number, self.title, self.url)
    }
}

/// The parsed reference section of a document, in order of definition.
///
/// A number defined twice keeps the position of its first definition but takes
/// the title and URL of the last one; the number is recorded in
/// [`ReferenceList::redefined`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceList {
    entries: Vec<ReferenceEntry>,
    redefined: Vec<CitationNumber>,
    /// Non-blank lines of the reference section that are not entries, with
    /// their line numbers.
    ignored_lines: Vec<(usize, String)>,
}

impl ReferenceList {
    /// Parses every reference section of `text`.
    pub fn parse(text: &str, config: &FormatterConfig) -> Self {
        let (ignored_lines, entries): (Vec<_>, Vec<_>) =
            Lines::new(text, &config.references_heading)
                .filter(|line| line.section == Section::References)
                .filter(|line| line.kind == LineKind::Text && !line.text.trim().is_empty())
                .partition_map(|line| match parse_entry(line.text, config) {
                    Some(entry) => Right(entry),
                    None => Left((line.number, line.text.to_string())),
                });

        let mut list = Self {
            ignored_lines,
            ..Self::default()
        };
        for entry in entries {
            list.insert(entry);
        }
        list
    }

    fn insert(&mut self, entry: ReferenceEntry) {
        match self.entries.iter_mut().find(|e| e.number == entry.number) {
            Some(existing) => {
                if !self.redefined.contains(&entry.number) {
                    self.redefined.push(entry.number.clone());
                }
                *existing = entry;
            }
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, number: &CitationNumber) -> Option<&ReferenceEntry> {
        self.entries.iter().find(|e| &e.number == number)
    }

    pub fn contains(&self, number: &CitationNumber) -> bool {
        self.get(number).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in order of first definition.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEntry> {
        self.entries.iter()
    }

    /// Numbers defined more than once, in the order the redefinition was seen.
    pub fn redefined(&self) -> &[CitationNumber] {
        &self.redefined
    }

    pub fn ignored_lines(&self) -> &[(usize, String)] {
        &self.ignored_lines
    }
}

impl<'a> IntoIterator for &'a ReferenceList {
    type Item = &'a ReferenceEntry;
    type IntoIter = std::slice::Iter<'a, ReferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse one line of the reference section.
fn parse_entry(line: &str, config: &FormatterConfig) -> Option<ReferenceEntry> {
    let captures = REFERENCE_LINE.captures(line)?;
    let title = captures[2].trim();
    if title.is_empty() {
        return None;
    }
    Some(ReferenceEntry {
        number: CitationNumber::new(&captures[1]),
        title: title.to_string(),
        url: canonicalize_with(captures[3].trim(), &config.tracking_params),
    })
}
