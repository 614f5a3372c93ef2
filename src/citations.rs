//! Inline citation scanning.

use crate::number::CitationNumber;
use crate::regex::Regex;
use crate::sections::{Lines, Section};
use itertools::Itertools;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub(crate) static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([0-9]+)\]").unwrap());

/// Every citation marker in `text`, in reading order, repeats included.
pub(crate) fn markers(text: &str) -> impl Iterator<Item = CitationNumber> + '_ {
    CITATION_MARKER
        .captures_iter(text)
        .map(|caps| CitationNumber::new(&caps[1]))
}

/// Distinct citation numbers used outside the reference sections, sorted by value.
pub(crate) fn inline_citations(text: &str, heading: &str) -> BTreeSet<CitationNumber> {
    Lines::new(text, heading)
        .filter(|line| line.section == Section::Body)
        .flat_map(|line| markers(line.text))
        .collect()
}

/// Distinct citation numbers of `body` in order of first appearance.
pub(crate) fn first_appearance(body: &str) -> Vec<CitationNumber> {
    markers(body).unique().collect()
}
