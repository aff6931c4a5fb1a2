use async_trait::async_trait;
use harvest_core::FavoritedItem;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Network(String),
    #[error("feed request timed out")]
    Timeout,
    #[error("feed returned http status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("feed payload could not be parsed: {0}")]
    Payload(String),
}

/// Source of the user's most recently favorited posts.
#[async_trait]
pub trait FavoriteFeed: Send + Sync {
    /// Fetch up to `limit` items, most recent first.
    async fn fetch_favorites(&self, limit: usize) -> Result<Vec<FavoritedItem>, FeedError>;
}
