//! Catalog Sampler
//!
//! Finds the number of listing pages, jumps to one page chosen uniformly at
//! random and extracts its (image link, title, artist) entries.

use crate::error::NavigationError;
use crate::selection::IndexPicker;
use reqwest::Url;
use serde::Serialize;
use tracing::info;

pub mod parse;
pub mod source;

pub use parse::ListingSelectors;
pub use source::{HttpPageSource, PageSource};

/// Base listing URL of the figurative art catalog
pub const CATALOG_URL: &str = "https://artvee.com/c/figurative/";

/// One listing on a catalog page; never persisted directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub image_link: String,
    pub title: String,
    pub artist: String,
}

/// Entries of the sampled page
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub page: u32,
    pub last_page: u32,
    pub url: Url,
    pub entries: Vec<CatalogEntry>,
}

impl CatalogPage {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn image_links(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.image_link.as_str()).collect()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.title.as_str()).collect()
    }

    pub fn artists(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.artist.as_str()).collect()
    }
}

/// Random page sampler over a paginated catalog
pub struct CatalogSampler<S> {
    source: S,
    base_url: Url,
    selectors: ListingSelectors,
}

impl<S: PageSource> CatalogSampler<S> {
    /// Sampler for the given listing root, using the artvee selectors
    pub fn new(source: S, base_url: &str) -> Result<Self, NavigationError> {
        let mut base_url = Url::parse(base_url).map_err(|e| NavigationError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        // Page URLs are joined onto the base, which needs a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            source,
            base_url,
            selectors: ListingSelectors::artvee()?,
        })
    }

    pub fn with_selectors(mut self, selectors: ListingSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of listing page `page` (1-based)
    pub fn page_url(&self, page: u32) -> Result<Url, NavigationError> {
        self.base_url
            .join(&format!("page/{}/", page))
            .map_err(|e| NavigationError::InvalidUrl {
                url: format!("{}page/{}/", self.base_url, page),
                reason: e.to_string(),
            })
    }

    /// Number of the last listing page, read from the base page
    pub async fn last_page_number(&self) -> Result<u32, NavigationError> {
        let html = self.source.fetch_html(&self.base_url).await?;
        info!(url = %self.base_url, "Moved to catalog");

        parse::last_page_number(&html, &self.selectors).ok_or_else(|| {
            NavigationError::MissingPagination {
                url: self.base_url.to_string(),
            }
        })
    }

    /// Fetch and parse one listing page
    pub async fn fetch_page(&self, page: u32, last_page: u32) -> Result<CatalogPage, NavigationError> {
        let url = self.page_url(page)?;
        let html = self.source.fetch_html(&url).await?;
        let entries = parse::listing_entries(&html, &url, &self.selectors);

        if entries.is_empty() {
            return Err(NavigationError::EmptyListing {
                url: url.to_string(),
            });
        }

        Ok(CatalogPage {
            page,
            last_page,
            url,
            entries,
        })
    }

    /// Pick a page uniformly in `[1, last]` and extract its entries
    pub async fn sample<P: IndexPicker + ?Sized>(
        &self,
        picker: &mut P,
    ) -> Result<CatalogPage, NavigationError> {
        let last_page = self.last_page_number().await?;
        info!(last_page, "Last page number found");

        let page = picker.pick(last_page as usize).min(last_page as usize - 1) as u32 + 1;
        let sampled = self.fetch_page(page, last_page).await?;
        info!(
            page,
            url = %sampled.url,
            entries = sampled.len(),
            "Sampled catalog page"
        );

        Ok(sampled)
    }
}
