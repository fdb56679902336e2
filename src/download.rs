//! Transient document downloads.
//!
//! Remote documents are streamed into the bot's working directory, relayed
//! to the chat and deleted again. Nothing here retries or resumes.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::db::DocumentSide;

/// Extension used when a URL carries no usable suffix
pub const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 8;

/// Materializes a remote resource on local disk
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Writes the resource at `url` to `destination`, returning the byte count
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64>;
}

/// Streaming HTTP(S) fetcher
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn stream_to(&self, url: &str, file: &mut tokio::fs::File) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to request document")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Document request failed with status {status}"));
        }

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read document body")?
        {
            file.write_all(&chunk)
                .await
                .context("Failed to write document chunk")?;
            written += chunk.len() as u64;
        }
        file.flush().await.context("Failed to flush document")?;

        Ok(written)
    }
}

#[async_trait]
impl FileFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .await
            .with_context(|| format!("Failed to create {}", destination.display()))?;

        match self.stream_to(url, &mut file).await {
            Ok(written) => {
                info!(path = %destination.display(), bytes = written, "Document downloaded");
                Ok(written)
            }
            Err(e) => {
                drop(file);
                // Partial files must not outlive a failed download
                if let Err(cleanup_err) = tokio::fs::remove_file(destination).await {
                    error!(path = %destination.display(), error = %cleanup_err, "Failed to remove partial download");
                }
                Err(e)
            }
        }
    }
}

/// Infer a file extension from a document URL.
///
/// Looks at the last path segment only (query and fragment are ignored)
/// and falls back to [`FALLBACK_EXTENSION`] when the suffix is missing or
/// does not look like an extension.
pub fn document_extension(url: &str) -> String {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segment = path.rsplit('/').next().unwrap_or_default();
    let extension = match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => return FALLBACK_EXTENSION.to_string(),
    };

    if extension.is_empty()
        || extension.len() > MAX_EXTENSION_LEN
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return FALLBACK_EXTENSION.to_string();
    }

    extension.to_ascii_lowercase()
}

/// Restrict a remote identifier to characters that are safe in a file name
fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

/// `<winner>_<side>_<millis>.<ext>`
pub fn transient_file_name(
    winner_id: &str,
    side: DocumentSide,
    at: DateTime<Utc>,
    url: &str,
) -> String {
    format!(
        "{}_{}_{}.{}",
        sanitize_component(winner_id),
        side.as_str(),
        at.timestamp_millis(),
        document_extension(url)
    )
}

/// Full path of a new transient file inside `dir`
pub fn transient_path(dir: &Path, winner_id: &str, side: DocumentSide, url: &str) -> PathBuf {
    dir.join(transient_file_name(winner_id, side, Utc::now(), url))
}

/// Delete a transient file, logging instead of failing
pub async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(temp_path = %path.display(), "Temporary file cleaned up successfully"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(temp_path = %path.display(), "Temporary file already gone")
        }
        Err(e) => {
            error!(temp_path = %path.display(), error = %e, "Failed to clean up temporary file")
        }
    }
}

/// Create the working directory for transient files if needed
pub async fn ensure_work_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create working directory {}", dir.display()))
}
