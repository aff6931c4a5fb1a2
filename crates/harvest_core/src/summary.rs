use std::fmt;

/// Counters for one harvest run, reported when the run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub items_fetched: usize,
    pub candidate_links: usize,
    pub already_processed: usize,
    pub downloaded: usize,
    pub failed: usize,
}

impl fmt::Display for HarvestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items fetched, {} paper links, {} already processed, {} downloaded, {} failed",
            self.items_fetched,
            self.candidate_links,
            self.already_processed,
            self.downloaded,
            self.failed
        )
    }
}
