//! Harvest core: pure domain model for the favorites-to-paper pipeline.
mod item;
mod links;
mod processed;
mod summary;

pub use item::{EmbeddedUrl, FavoritedItem};
pub use links::{CandidateLink, LinkExtractor};
pub use processed::ProcessedSet;
pub use summary::HarvestSummary;
