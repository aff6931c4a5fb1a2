use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use harvest_core::CandidateLink;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::filename::artifact_filename;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("artifact request failed: {0}")]
    Network(String),
    #[error("artifact request timed out")]
    Timeout,
    #[error("artifact returned http status {0}")]
    HttpStatus(u16),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetches the document behind a resolved link into local storage.
#[async_trait]
pub trait ArtifactDownloader: Send + Sync {
    /// Download the artifact for `link`, naming the file after `title`.
    /// Returns the final path on success.
    async fn download(&self, link: &CandidateLink, title: &str) -> Result<PathBuf, DownloadError>;
}

/// Production downloader: streams the file rendition of an abstract link to
/// `{artifact_dir}/{title}.pdf`.
pub struct PdfDownloader {
    client: reqwest::Client,
    artifact_dir: PathBuf,
}

impl PdfDownloader {
    pub fn new(client: reqwest::Client, artifact_dir: PathBuf) -> Self {
        Self {
            client,
            artifact_dir,
        }
    }
}

#[async_trait]
impl ArtifactDownloader for PdfDownloader {
    async fn download(&self, link: &CandidateLink, title: &str) -> Result<PathBuf, DownloadError> {
        let url = pdf_url(link);
        let filename = artifact_filename(title);
        let target = self.artifact_dir.join(&filename);
        let part = self.artifact_dir.join(format!("{filename}.part"));

        fs::create_dir_all(&self.artifact_dir).await?;

        let response = self.client.get(&url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        // Stream through a .part file; the final name only appears once the
        // body arrived completely.
        let finished = match write_body(response, &part).await {
            Ok(()) => fs::rename(&part, &target).await.map_err(DownloadError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = finished {
            let _ = fs::remove_file(&part).await;
            return Err(err);
        }
        Ok(target)
    }
}

async fn write_body(response: reqwest::Response, part: &Path) -> Result<(), DownloadError> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part)
        .await?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(())
}

/// Rewrite an abstract link back to its direct-file form.
fn pdf_url(link: &CandidateLink) -> String {
    link.as_str().replacen("/abs/", "/pdf/", 1)
}

fn map_reqwest_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        return DownloadError::Timeout;
    }
    DownloadError::Network(err.to_string())
}
