use async_trait::async_trait;
use chrono::{DateTime, Utc};
use harvest_core::{EmbeddedUrl, FavoritedItem};
use harvest_logging::harvest_debug;
use serde::Deserialize;

use crate::feed::{FavoriteFeed, FeedError};
use crate::oauth::OauthCredentials;

const DEFAULT_API_BASE: &str = "https://api.twitter.com/1.1";
/// Upper bound the `favorites/list` endpoint accepts per page.
const PAGE_SIZE: usize = 200;
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Feed adapter for the v1.1 `favorites/list` endpoint.
///
/// Pages through the feed with the `max_id` cursor until the requested
/// number of items is collected or the feed runs dry.
pub struct TwitterFeed {
    client: reqwest::Client,
    credentials: OauthCredentials,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TweetDto {
    id: u64,
    #[serde(alias = "full_text")]
    text: String,
    created_at: String,
    #[serde(default)]
    entities: EntitiesDto,
}

#[derive(Debug, Default, Deserialize)]
struct EntitiesDto {
    #[serde(default)]
    urls: Vec<UrlEntityDto>,
}

#[derive(Debug, Deserialize)]
struct UrlEntityDto {
    expanded_url: String,
}

impl TwitterFeed {
    pub fn new(client: reqwest::Client, credentials: OauthCredentials) -> Self {
        Self::with_api_base(client, credentials, DEFAULT_API_BASE)
    }

    /// Point the adapter at a different API root. Used by tests.
    pub fn with_api_base(
        client: reqwest::Client,
        credentials: OauthCredentials,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            api_base: api_base.into(),
        }
    }

    async fn fetch_page(
        &self,
        count: usize,
        max_id: Option<u64>,
    ) -> Result<Vec<TweetDto>, FeedError> {
        let url = format!("{}/favorites/list.json", self.api_base);
        let mut query: Vec<(String, String)> = vec![
            ("count".into(), count.to_string()),
            ("tweet_mode".into(), "extended".into()),
        ];
        if let Some(max_id) = max_id {
            query.push(("max_id".into(), max_id.to_string()));
        }

        let authorization = self.credentials.authorization_header(&url, &query);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&payload).map_err(|err| FeedError::Payload(err.to_string()))
    }
}

#[async_trait]
impl FavoriteFeed for TwitterFeed {
    async fn fetch_favorites(&self, limit: usize) -> Result<Vec<FavoritedItem>, FeedError> {
        let mut items = Vec::new();
        let mut max_id: Option<u64> = None;

        while items.len() < limit {
            let want = (limit - items.len()).min(PAGE_SIZE);
            let page = self.fetch_page(want, max_id).await?;
            harvest_debug!("Fetched page of {} favorites (max_id {:?})", page.len(), max_id);

            let Some(last) = page.last() else {
                break;
            };
            // The cursor continues strictly below the oldest id seen.
            max_id = Some(last.id.saturating_sub(1));

            for tweet in page {
                items.push(to_item(tweet)?);
            }
        }

        Ok(items)
    }
}

fn to_item(tweet: TweetDto) -> Result<FavoritedItem, FeedError> {
    let created_at = DateTime::parse_from_str(&tweet.created_at, CREATED_AT_FORMAT)
        .map_err(|err| {
            FeedError::Payload(format!("bad created_at {:?}: {err}", tweet.created_at))
        })?
        .with_timezone(&Utc);

    Ok(FavoritedItem {
        id: tweet.id,
        text: tweet.text,
        created_at,
        urls: tweet
            .entities
            .urls
            .into_iter()
            .map(|entity| EmbeddedUrl {
                expanded: entity.expanded_url,
            })
            .collect(),
    })
}

fn map_reqwest_error(err: reqwest::Error) -> FeedError {
    if err.is_timeout() {
        return FeedError::Timeout;
    }
    FeedError::Network(err.to_string())
}
