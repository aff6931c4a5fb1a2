use std::collections::BTreeSet;
use std::fmt;

use url::Url;

use crate::FavoritedItem;

const DEFAULT_MARKER: &str = "arxiv";

/// Normalized abstract-page URL, the unique processing key of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateLink(String);

impl CandidateLink {
    /// Wrap a key that was previously produced by [`LinkExtractor::normalize`],
    /// for example one read back from the processed record.
    pub fn from_normalized(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CandidateLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Picks paper links out of favorited items and rewrites them to their
/// canonical abstract-page form.
pub struct LinkExtractor {
    marker: String,
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self::with_marker(DEFAULT_MARKER)
    }

    /// Restrict extraction to URLs containing `marker`.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Collect the normalized paper links embedded in one item.
    ///
    /// An item without matching links yields the empty set.
    pub fn extract(&self, item: &FavoritedItem) -> BTreeSet<CandidateLink> {
        item.urls
            .iter()
            .filter_map(|url| self.normalize(&url.expanded))
            .collect()
    }

    /// Rewrite a raw URL into its canonical abstract-page form.
    ///
    /// Returns `None` for URLs that do not parse or do not carry the marker.
    /// Direct-file URLs lose their `.pdf` extension and their `pdf` path
    /// segment becomes `abs`; already-normalized input passes through
    /// unchanged, so the rewrite is idempotent.
    pub fn normalize(&self, raw: &str) -> Option<CandidateLink> {
        let mut url = Url::parse(raw.trim()).ok()?;
        if !url.as_str().contains(&self.marker) {
            return None;
        }

        let path = url.path();
        let path = path.strip_suffix(".pdf").unwrap_or(path).to_string();
        let mut segments: Vec<&str> = path.split('/').collect();
        if let Some(segment) = segments.iter_mut().find(|segment| **segment == "pdf") {
            *segment = "abs";
        }
        url.set_path(&segments.join("/"));

        Some(CandidateLink(url.into()))
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}
