use chrono::{DateTime, Utc};

/// One favorited post as returned by the feed, reduced to the fields the
/// pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritedItem {
    pub id: u64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub urls: Vec<EmbeddedUrl>,
}

/// A link embedded in a post, already expanded from its shortener form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedUrl {
    pub expanded: String,
}
