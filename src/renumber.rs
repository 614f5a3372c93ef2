//! Citation renumbering.
//!
//! Renumbering walks the body in reading order and gives each distinct cited
//! reference the next free number, starting at 1. References that share a
//! canonical URL share a number (an empty query counts as no query). The
//! reference section is then rebuilt from the new numbering:
//!
//! ```
//! let text = "See [2] and [5].\n\n## References\n[2] Foo — https://a.com/?utm_source=z\n[5] Bar — https://b.com/\n";
//!
//! assert_eq!(
//!     citenorm::renumber(text),
//!     "See [1] and [2].\n\n## References\n[1] Foo — https://a.com/?\n[2] Bar — https://b.com/\n"
//! );
//! ```
//!
//! Citations without a matching reference are left as they are, and references
//! that are never cited are dropped from the rebuilt section. An orphan whose
//! number is also handed out as a new number becomes indistinguishable from
//! that citation afterwards: `Cites [5] and [1].` with only `[5]` defined
//! formats to `Cites [1] and [1].`, and the orphan is no longer reported.
//!
//! Entries from every reference section are folded into the rebuilt one, and
//! later reference sections are removed. Lines of a reference section that
//! are not entries are dropped with a warning.

use crate::canonical::url_key;
use crate::citations::{first_appearance, CITATION_MARKER};
use crate::number::CitationNumber;
use crate::references::{ReferenceEntry, ReferenceList};
use crate::regex::Captures;
use crate::sections::Layout;
use crate::FormatterConfig;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// The result of planning a renumbering pass: the old → new number mapping
/// and the deduplicated set of references under their new numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Renumbering {
    mapping: BTreeMap<CitationNumber, CitationNumber>,
    references: Vec<ReferenceEntry>,
}

impl Renumbering {
    /// Plans new numbers for the citations in `order`, which must be distinct
    /// and in order of first appearance. Numbers missing from `references` are
    /// skipped.
    pub fn plan(order: &[CitationNumber], references: &ReferenceList) -> Self {
        let mut by_url: HashMap<Cow<'_, str>, CitationNumber> = HashMap::new();
        let mut renumbering = Self::default();

        for old in order {
            let Some(entry) = references.get(old) else {
                continue;
            };
            let key = url_key(&entry.url);
            let new = match by_url.get(&key).cloned() {
                Some(existing) => {
                    debug!(old = %old, new = %existing, url = %entry.url, "merged duplicate reference");
                    existing
                }
                None => {
                    let new = CitationNumber::from_index(renumbering.references.len() + 1);
                    by_url.insert(key, new.clone());
                    renumbering.references.push(ReferenceEntry {
                        number: new.clone(),
                        ..entry.clone()
                    });
                    new
                }
            };
            renumbering.mapping.insert(old.clone(), new);
        }

        renumbering
    }

    /// New number for an old citation, if it was renumbered.
    pub(crate) fn get(&self, old: &CitationNumber) -> Option<&CitationNumber> {
        self.mapping.get(old)
    }

    /// Old → new mapping, ordered by old number.
    pub fn mapping(&self) -> &BTreeMap<CitationNumber, CitationNumber> {
        &self.mapping
    }

    /// The rebuilt references in ascending new-number order.
    pub fn references(&self) -> &[ReferenceEntry] {
        &self.references
    }

    /// Rewrites every citation marker in `body`; unmapped markers are kept verbatim.
    pub fn rewrite(&self, body: &str) -> String {
        CITATION_MARKER
            .replace_all(body, |caps: &Captures| {
                match self.get(&CitationNumber::new(&caps[1])) {
                    Some(new) => format!("[{new}]"),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// The rebuilt reference section: heading plus one line per entry, newline terminated.
    pub fn render_section(&self, heading: &str) -> String {
        let mut section = format!("## {heading}\n");
        for entry in &self.references {
            section.push_str(&entry.to_string());
            section.push('\n');
        }
        section
    }
}

/// Plans the renumbering of `text`, or `None` when it has no references.
pub(crate) fn plan(text: &str, config: &FormatterConfig) -> Option<(Layout, Renumbering)> {
    let references = ReferenceList::parse(text, config);
    if references.is_empty() {
        debug!("no references found; nothing to renumber");
        return None;
    }
    let layout = Layout::locate(text, &config.references_heading)?;
    for (line, content) in references.ignored_lines() {
        warn!(line, content = %content, "dropping unrecognised reference line");
    }
    let order = first_appearance(&text[layout.body.clone()]);
    let renumbering = Renumbering::plan(&order, &references);
    debug!(
        section_bytes = layout.references.len(),
        parsed = references.len(),
        cited = order.len(),
        kept = renumbering.references.len(),
        "planned renumbering"
    );
    Some((layout, renumbering))
}

pub(crate) fn renumber(text: &str, config: &FormatterConfig) -> String {
    let Some((layout, renumbering)) = plan(text, config) else {
        return text.to_string();
    };

    let body = renumbering.rewrite(&text[layout.body.clone()]);
    let tail = layout.tail_text(text);

    let mut result = String::with_capacity(text.len());
    result.push_str(body.trim_end());
    result.push_str("\n\n");
    result.push_str(&renumbering.render_section(&config.references_heading));
    if !tail.is_empty() {
        result.push('\n');
        result.push_str(&tail);
    }
    result
}
