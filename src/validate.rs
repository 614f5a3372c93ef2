//! Citation consistency checks.

use crate::canonical::url_key;
use crate::citations::inline_citations;
use crate::number::CitationNumber;
use crate::references::ReferenceList;
use crate::FormatterConfig;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::debug;

/// A single citation/reference inconsistency found in a document.
///
/// Diagnostics are advisory. The [`fmt::Display`] form is the human-readable
/// warning, e.g. `Citation [4] has no matching reference`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A citation marker with no reference entry.
    OrphanCitation { number: CitationNumber },
    /// A reference entry that no citation marker points at.
    UnusedReference { number: CitationNumber },
    /// Two reference entries with the same canonical URL; `first` was defined earlier.
    DuplicateUrl {
        first: CitationNumber,
        second: CitationNumber,
        url: String,
    },
    /// A reference number defined more than once; only the last definition is used.
    RedefinedReference { number: CitationNumber },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OrphanCitation { number } => {
                write!(f, "Citation [{number}] has no matching reference")
            }
            Diagnostic::UnusedReference { number } => {
                write!(f, "Reference [{number}] is never cited in the text")
            }
            Diagnostic::DuplicateUrl { first, second, url } => {
                write!(f, "Duplicate URL: [{first}] and [{second}] point to {url}")
            }
            Diagnostic::RedefinedReference { number } => {
                write!(f, "Reference [{number}] is defined more than once")
            }
        }
    }
}

/// Checks `text`: orphan citations, then unused references (each in ascending
/// numeric order), then duplicate URLs and redefined numbers in the order the
/// references are defined. An empty result means the document is consistent.
pub(crate) fn validate(text: &str, config: &FormatterConfig) -> Vec<Diagnostic> {
    let references = ReferenceList::parse(text, config);
    let cited = inline_citations(text, &config.references_heading);
    let defined: BTreeSet<CitationNumber> = references.iter().map(|e| e.number.clone()).collect();

    let orphans = cited
        .difference(&defined)
        .map(|number| Diagnostic::OrphanCitation {
            number: number.clone(),
        });
    let unused = defined
        .difference(&cited)
        .map(|number| Diagnostic::UnusedReference {
            number: number.clone(),
        });
    let redefined = references
        .redefined()
        .iter()
        .map(|number| Diagnostic::RedefinedReference {
            number: number.clone(),
        });

    let diagnostics = orphans
        .chain(unused)
        .chain(duplicate_urls(&references))
        .chain(redefined)
        .collect_vec();

    debug!(
        references = references.len(),
        citations = cited.len(),
        diagnostics = diagnostics.len(),
        "validated document"
    );
    diagnostics
}

/// One diagnostic per URL shared by several entries, naming its first two numbers.
fn duplicate_urls(references: &ReferenceList) -> Vec<Diagnostic> {
    let mut groups: Vec<Vec<&CitationNumber>> = Vec::new();
    let mut index: HashMap<Cow<'_, str>, usize> = HashMap::new();
    let mut urls = Vec::new();

    for entry in references {
        let key = url_key(&entry.url);
        match index.get(&key).copied() {
            Some(i) => groups[i].push(&entry.number),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![&entry.number]);
                urls.push(entry.url.as_str());
            }
        }
    }

    groups
        .into_iter()
        .zip(urls)
        .filter_map(|(numbers, url)| match numbers.as_slice() {
            [first, second, ..] => Some(Diagnostic::DuplicateUrl {
                first: (*first).clone(),
                second: (*second).clone(),
                url: url.to_string(),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn messages(text: &str) -> Vec<String> {
        validate(text, &FormatterConfig::default())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_consistent_document() {
        let text = "Cites [1] and [2].\n\n## References\n[1] A — https://a.com/\n[2] B — https://b.com/\n";
        assert!(messages(text).is_empty());
    }

    #[test]
    fn test_orphans_and_unused_sorted_numerically() {
        let text = "Cites [10], [3], [1].\n\n## References\n[1] A — https://a.com/\n[20] B — https://b.com/\n[4] C — https://c.com/\n";
        assert_eq!(
            messages(text),
            vec![
                "Citation [3] has no matching reference",
                "Citation [10] has no matching reference",
                "Reference [4] is never cited in the text",
                "Reference [20] is never cited in the text",
            ]
        );
    }

    #[test]
    fn test_duplicate_url_reported_once() {
        let text = "[1] [2]\n## References\n[1] A — https://e.com/x\n[2] B — https://e.com/x\n";
        let diagnostics = validate(text, &FormatterConfig::default());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::DuplicateUrl {
                first: CitationNumber::new("1"),
                second: CitationNumber::new("2"),
                url: "https://e.com/x".to_string(),
            }]
        );
        assert_eq!(
            diagnostics[0].to_string(),
            "Duplicate URL: [1] and [2] point to https://e.com/x"
        );
    }

    #[test]
    fn test_duplicate_url_after_canonicalization() {
        let text = "[5] [3] [4]\n## References\n[5] A — https://e.com/x?utm_source=a\n[3] B — https://e.com/x\n[4] C — https://e.com/x?gclid=1\n";
        assert_eq!(
            messages(text),
            vec!["Duplicate URL: [5] and [3] point to https://e.com/x?"]
        );
    }

    #[test]
    fn test_redefined_reference() {
        let text = "[1]\n## References\n[1] A — https://a.com/\n[1] B — https://b.com/\n";
        assert_eq!(messages(text), vec!["Reference [1] is defined more than once"]);
    }

    #[test]
    fn test_no_reference_section_makes_everything_orphan() {
        let text = "Cites [2] and [1].\n[1] Not a section — https://a.com/\n";
        assert_eq!(
            messages(text),
            vec![
                "Citation [1] has no matching reference",
                "Citation [2] has no matching reference",
            ]
        );
    }

    #[test]
    fn test_tail_citations_count_as_cited() {
        let text = "Body.\n## References\n[1] A — https://a.com/\n## Appendix\nSee [1].\n";
        assert!(messages(text).is_empty());
    }

    #[test]
    fn test_orphan_message() {
        let diagnostic = Diagnostic::OrphanCitation {
            number: CitationNumber::new("7"),
        };
        assert_eq!(diagnostic.to_string(), "Citation [7] has no matching reference");
    }
}
