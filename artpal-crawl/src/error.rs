//! Error types for artpal-crawl
//!
//! Every variant is fatal to the run: nothing is retried, the first error
//! propagates to `main` and ends the process with a non-zero status.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for crawl stages
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Top-level run error
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Catalog page retrieval or parsing failed
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Image download failed
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Downloaded image could not be turned into a palette
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Duplicate check or insert failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] artpal_common::Error),

    /// Every entry on the sampled page is already recorded
    #[error("No unseen entries on page {page} ({candidates} candidates already recorded)")]
    NoUnseenEntries { page: u32, candidates: usize },
}

/// Catalog navigation failures
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid catalog URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("No numeric pagination control on {url}")]
    MissingPagination { url: String },

    #[error("No listings found on {url}")]
    EmptyListing { url: String },
}

/// Image download failures
#[derive(Debug, Error)]
pub enum TransferError {
    /// Non-success status; the response body was drained before failing
    #[error("Failed to get '{url}' ({status})")]
    Status { url: String, status: u16 },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Refusing non-https URL '{url}'")]
    InsecureUrl { url: String },
}

/// Pixel decode and palette failures
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to decode {}: {}", .path.display(), .source)]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to open {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No opaque pixels to cluster in {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("Decode task failed: {0}")]
    Task(String),
}

impl TransferError {
    /// HTTP status attached to the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TransferError::Status { status, .. } => Some(*status),
            TransferError::Request { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
