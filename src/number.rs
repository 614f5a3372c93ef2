//! Citation numbers.
//!
//! Markers are kept as the digits they were written with, so `[01]` and `[1]`
//! stay distinct keys, but they sort by integer value.

use compact_str::{CompactString, ToCompactString};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The numeric text of a citation marker or reference entry, e.g. `12` in `[12]`.
///
/// Ordering compares integer values without parsing, so arbitrarily long digit
/// runs never overflow. Numbers with equal value but different text (`01`, `1`)
/// are ordered by their raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationNumber(CompactString);

impl CitationNumber {
    /// Wraps the digits of a marker. The caller guarantees `digits` is ASCII digits.
    pub(crate) fn new(digits: &str) -> Self {
        Self(CompactString::from(digits))
    }

    /// Creates the number for a 1-based position in a renumbered sequence.
    pub fn from_index(index: usize) -> Self {
        Self(index.to_compact_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digits without leading zeros; `"0"` for an all-zero number.
    fn significant(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }
}

impl Ord for CitationNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.significant(), other.significant());
        a.len()
            .cmp(&b.len())
            .then_with(|| a.cmp(b))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for CitationNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CitationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CitationNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_not_lexicographic_order() {
        let sorted = ["10", "2", "1", "100", "9"]
            .into_iter()
            .map(CitationNumber::new)
            .sorted()
            .map(|n| n.to_string())
            .collect_vec();
        assert_eq!(sorted, vec!["1", "2", "9", "10", "100"]);
    }

    #[test]
    fn test_leading_zeros_compare_by_value() {
        let a = CitationNumber::new("007");
        let b = CitationNumber::new("8");
        assert!(a < b);
        assert_ne!(CitationNumber::new("01"), CitationNumber::new("1"));
        assert!(CitationNumber::new("01") < CitationNumber::new("1"));
    }

    #[test]
    fn test_long_digit_runs_do_not_overflow() {
        let big = CitationNumber::new("184467440737095516160000");
        let small = CitationNumber::new("18446744073709551615");
        assert!(small < big);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(CitationNumber::from_index(12).as_str(), "12");
    }
}
