use async_trait::async_trait;
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use harvest_core::CandidateLink;
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("title request failed: {0}")]
    Network(String),
    #[error("title request timed out")]
    Timeout,
    #[error("abstract page returned http status {0}")]
    HttpStatus(u16),
    #[error("abstract page could not be decoded as {0}")]
    Decode(String),
    #[error("abstract page has no usable title")]
    MissingTitle,
}

/// Resolves a paper link to its display title.
#[async_trait]
pub trait TitleResolver: Send + Sync {
    async fn resolve_title(&self, link: &CandidateLink) -> Result<String, ResolveError>;
}

/// Production resolver: one GET of the abstract page, then the `<title>`
/// text with any listing prefix removed.
pub struct HttpTitleResolver {
    client: reqwest::Client,
}

impl HttpTitleResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TitleResolver for HttpTitleResolver {
    async fn resolve_title(&self, link: &CandidateLink) -> Result<String, ResolveError> {
        debug_assert!(
            !link.as_str().contains("/pdf/"),
            "resolver takes abstract-page links, got {link}"
        );

        let response = self
            .client
            .get(link.as_str())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        let html = decode_page(&body, content_type.as_deref())?;
        page_title(&html)
            .map(|title| strip_listing_prefix(&title).to_string())
            .filter(|title| !title.is_empty())
            .ok_or(ResolveError::MissingTitle)
    }
}

fn page_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Abstract pages usually title themselves `[<id>] <paper title>`; only the
/// paper title is wanted.
fn strip_listing_prefix(title: &str) -> &str {
    let trimmed = title.trim_start();
    if let Some(rest) = trimmed.strip_prefix('[') {
        if let Some((_, tail)) = rest.split_once(']') {
            return tail.trim_start();
        }
    }
    trimmed
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset ->
/// chardetng fallback.
fn decode_page(bytes: &[u8], content_type: Option<&str>) -> Result<String, ResolveError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(header_charset) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, encoding);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn header_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            part.trim()
                .split_once('=')
                .filter(|(key, _)| key.eq_ignore_ascii_case("charset"))
                .map(|(_, value)| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        })
        .next()
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<String, ResolveError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ResolveError::Decode(encoding.name().to_string()));
    }
    Ok(text.into_owned())
}

fn map_reqwest_error(err: reqwest::Error) -> ResolveError {
    if err.is_timeout() {
        return ResolveError::Timeout;
    }
    ResolveError::Network(err.to_string())
}
