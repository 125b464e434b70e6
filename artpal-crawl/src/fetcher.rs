//! Image Fetcher
//!
//! Streams a remote image into the staging file. Resolves only once every
//! byte has been written and synced.

use crate::error::TransferError;
use artpal_common::CrawlConfig;
use reqwest::{Client, StatusCode, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Downloads images over a single reused HTTP client
pub struct ImageFetcher {
    client: Client,
    download_path: PathBuf,
    require_https: bool,
}

impl ImageFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, TransferError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(TransferError::Client)?;

        Ok(Self {
            client,
            download_path: config.download_path.clone(),
            require_https: config.require_https,
        })
    }

    /// Configured staging file
    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    /// Download `url` into the staging file
    pub async fn fetch(&self, url: &str) -> Result<u64, TransferError> {
        self.fetch_to(url, &self.download_path).await
    }

    /// Download `url` into `dest`, overwriting it; returns the byte count
    ///
    /// A non-200 response drains its body and fails without touching `dest`.
    pub async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        let parsed = Url::parse(url).map_err(|e| TransferError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if self.require_https && parsed.scheme() != "https" {
            return Err(TransferError::InsecureUrl {
                url: url.to_string(),
            });
        }

        let request_error = |source| TransferError::Request {
            url: url.to_string(),
            source,
        };

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            // Consume the body so the connection is released cleanly
            if let Err(e) = response.bytes().await {
                debug!("Failed to drain response body: {}", e);
            }
            warn!(url, status = status.as_u16(), "Image download refused");
            return Err(TransferError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let write_error = |source| TransferError::Write {
            path: dest.to_path_buf(),
            source,
        };

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        let mut file = File::create(dest).await.map_err(write_error)?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            file.write_all(&chunk).await.map_err(write_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_error)?;
        file.sync_all().await.map_err(write_error)?;

        info!(path = %dest.display(), bytes = written, "Image saved successfully");
        Ok(written)
    }
}
