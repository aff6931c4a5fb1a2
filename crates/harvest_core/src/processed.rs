use std::collections::BTreeSet;

use crate::CandidateLink;

/// Record of links whose artifacts were already downloaded.
///
/// Ordered so the persisted form stays stable across runs. Links are only
/// ever added, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedSet {
    links: BTreeSet<CandidateLink>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_links(links: impl IntoIterator<Item = CandidateLink>) -> Self {
        Self {
            links: links.into_iter().collect(),
        }
    }

    pub fn contains(&self, link: &CandidateLink) -> bool {
        self.links.contains(link)
    }

    /// Record a completed download. Returns `false` if the link was already
    /// present.
    pub fn insert(&mut self, link: CandidateLink) -> bool {
        self.links.insert(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateLink> {
        self.links.iter()
    }

    /// The subset of `candidates` not yet recorded, in stable order.
    pub fn unprocessed(&self, candidates: &BTreeSet<CandidateLink>) -> Vec<CandidateLink> {
        candidates.difference(&self.links).cloned().collect()
    }
}
