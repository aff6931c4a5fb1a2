//! Harvest engine: feed access, title resolution, artifact download, and the
//! durable processed-link store.
mod http;
mod oauth;
mod feed;
mod twitter;
mod resolve;
mod filename;
mod download;
mod store;
mod harvest;

pub use download::{ArtifactDownloader, DownloadError, PdfDownloader};
pub use feed::{FavoriteFeed, FeedError};
pub use filename::artifact_filename;
pub use harvest::{HarvestError, HarvestRunner};
pub use http::{build_client, HttpSettings};
pub use oauth::OauthCredentials;
pub use resolve::{HttpTitleResolver, ResolveError, TitleResolver};
pub use store::{ProcessedStore, StoreError, StoreLock};
pub use twitter::TwitterFeed;
