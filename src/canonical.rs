//! URL canonicalization.
//!
//! Removes tracking and analytics parameters from the query string of a
//! reference URL so that two links to the same page compare equal.
//!
//! ```
//! use citenorm::canonicalize;
//!
//! assert_eq!(
//!     canonicalize("https://x.com/a?utm_source=foo&id=5"),
//!     "https://x.com/a?id=5"
//! );
//! ```
//!
//! The URL is split on the first `#` (fragment) and the first `?` (query);
//! nothing else is parsed, so malformed input passes through unchanged apart
//! from the query rewrite. A URL without any tracking parameter is returned
//! byte-for-byte.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use url::form_urlencoded;

const DEFAULT_TRACKING_PARAMS: [&str; 16] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "gclsrc",
    "dclid",
    "msclkid",
    "mc_cid",
    "mc_eid",
    "ref",
    "source",
    "s",
    "si",
];

/// Denylist of query parameter names that are stripped from reference URLs.
///
/// Names are stored and matched lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingParams(Vec<CompactString>);

impl Default for TrackingParams {
    fn default() -> Self {
        Self(
            DEFAULT_TRACKING_PARAMS
                .iter()
                .map(|&name| CompactString::from(name))
                .collect(),
        )
    }
}

impl TrackingParams {
    /// An empty denylist; canonicalization becomes the identity.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Adds a parameter name to the denylist.
    pub fn insert(&mut self, name: &str) {
        let name = CompactString::from(name.to_lowercase());
        if !self.0.contains(&name) {
            self.0.push(name);
        }
    }

    /// Removes a parameter name from the denylist, returning whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let name = name.to_lowercase();
        let before = self.0.len();
        self.0.retain(|n| *n != name);
        self.0.len() != before
    }

    /// Whether `name` is a tracking parameter, ignoring ASCII and Unicode case.
    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.0.iter().any(|n| *n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|n| n.as_str())
    }
}

/// Strips every query parameter named in `params` from `url`.
///
/// Remaining parameters keep their original text, order, and multiplicity.
/// When every parameter is stripped the `?` is kept, giving an empty query
/// (`https://a.com/?utm_source=z` becomes `https://a.com/?`).
pub fn canonicalize_with(url: &str, params: &TrackingParams) -> String {
    let (rest, fragment) = match url.find('#') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    let Some((base, query)) = rest.split_once('?') else {
        return url.to_string();
    };

    let (kept, stripped): (Vec<&str>, Vec<&str>) = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .partition(|segment| !params.contains(&param_name(segment)));

    if stripped.is_empty() {
        return url.to_string();
    }

    format!("{base}?{}{fragment}", kept.join("&"))
}

/// Comparison key for canonical URLs: an empty query (`https://a.com/?`) is
/// the same resource as no query (`https://a.com/`).
pub(crate) fn url_key(url: &str) -> Cow<'_, str> {
    let (rest, fragment) = match url.find('#') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    match rest.strip_suffix('?') {
        Some(stripped) => Cow::Owned(format!("{stripped}{fragment}")),
        None => Cow::Borrowed(url),
    }
}

/// Decoded name of a `name=value` query segment (`utm%5Fsource` is `utm_source`).
fn param_name(segment: &str) -> Cow<'_, str> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(name, _)| name)
        .unwrap_or_default()
}
