use std::collections::BTreeSet;
use std::path::PathBuf;

use harvest_core::{CandidateLink, HarvestSummary, LinkExtractor};
use harvest_logging::{harvest_debug, harvest_info, harvest_warn};
use thiserror::Error;

use crate::download::{ArtifactDownloader, DownloadError};
use crate::feed::{FavoriteFeed, FeedError};
use crate::resolve::{ResolveError, TitleResolver};
use crate::store::{ProcessedStore, StoreError};

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("favorites fetch failed: {0}")]
    Feed(#[from] FeedError),
}

#[derive(Debug, Error)]
enum LinkFailure {
    #[error("title resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),
}

/// Wires the feed, the resolver, the downloader, and the store into one run.
///
/// Per-link failures are logged and counted, they never abort the run; the
/// failed links stay out of the record so the next run retries exactly them.
/// Store and feed failures are fatal.
pub struct HarvestRunner {
    feed: Box<dyn FavoriteFeed>,
    resolver: Box<dyn TitleResolver>,
    downloader: Box<dyn ArtifactDownloader>,
    store: ProcessedStore,
    extractor: LinkExtractor,
    max_items: usize,
}

impl HarvestRunner {
    pub fn new(
        feed: Box<dyn FavoriteFeed>,
        resolver: Box<dyn TitleResolver>,
        downloader: Box<dyn ArtifactDownloader>,
        store: ProcessedStore,
        extractor: LinkExtractor,
        max_items: usize,
    ) -> Self {
        Self {
            feed,
            resolver,
            downloader,
            store,
            extractor,
            max_items,
        }
    }

    /// One harvest: fetch favorites, diff links against the record, download
    /// what is new, persist the record.
    pub async fn run(&mut self) -> Result<HarvestSummary, HarvestError> {
        let _lock = self.store.lock()?;
        let mut processed = self.store.load()?;

        let items = self.feed.fetch_favorites(self.max_items).await?;
        harvest_info!("Fetched {} favorited items", items.len());

        let mut candidates: BTreeSet<CandidateLink> = BTreeSet::new();
        for item in &items {
            candidates.extend(self.extractor.extract(item));
        }

        let fresh = processed.unprocessed(&candidates);
        let mut summary = HarvestSummary {
            items_fetched: items.len(),
            candidate_links: candidates.len(),
            already_processed: candidates.len() - fresh.len(),
            ..HarvestSummary::default()
        };
        harvest_info!(
            "{} paper links, {} new, {} already processed",
            summary.candidate_links,
            fresh.len(),
            summary.already_processed
        );

        for link in fresh {
            match self.process_link(&link).await {
                Ok(path) => {
                    harvest_info!("Downloaded {} to {:?}", link, path);
                    processed.insert(link);
                    summary.downloaded += 1;
                }
                Err(reason) => {
                    harvest_warn!("Skipping {} this run: {}", link, reason);
                    summary.failed += 1;
                }
            }
        }

        // Persist whatever succeeded even when some links failed.
        self.store.persist(&processed)?;
        Ok(summary)
    }

    async fn process_link(&self, link: &CandidateLink) -> Result<PathBuf, LinkFailure> {
        let title = self.resolver.resolve_title(link).await?;
        harvest_debug!("Resolved {} as {:?}", link, title);
        let path = self.downloader.download(link, &title).await?;
        Ok(path)
    }
}
