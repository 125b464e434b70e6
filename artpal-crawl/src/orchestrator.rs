//! Run Orchestrator
//!
//! One awaited pipeline: sample a page, select an unseen entry, download its
//! image, extract the palette, insert the record. The first error ends the
//! run; nothing is retried.

use crate::catalog::{CatalogSampler, HttpPageSource, PageSource, CATALOG_URL};
use crate::error::CrawlResult;
use crate::fetcher::ImageFetcher;
use crate::palette::{PaletteColor, PaletteExtractor};
use crate::selection::{select_unseen, IndexPicker};
use artpal_common::{ArtworkRecord, ArtworkStore, CrawlConfig, PgGateway};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Outcome of one completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub last_page: u32,
    pub page: u32,
    /// Entries found on the sampled page
    pub candidates: usize,
    pub chosen_index: usize,
    pub bytes_downloaded: u64,
    pub record: ArtworkRecord,
    pub colors: Vec<PaletteColor>,
    /// 0 on a dry run
    pub rows_affected: u64,
    pub dry_run: bool,
}

/// Wires the sampler, store, fetcher and extractor into one run
pub struct Crawler<S> {
    sampler: CatalogSampler<S>,
    store: Arc<dyn ArtworkStore>,
    fetcher: ImageFetcher,
    extractor: PaletteExtractor,
    dry_run: bool,
}

impl Crawler<HttpPageSource> {
    /// Production wiring: the figurative catalog and the Postgres gateway
    pub fn from_config(config: &CrawlConfig) -> CrawlResult<Self> {
        let source = HttpPageSource::new(&config.user_agent, config.require_https)?;
        let sampler = CatalogSampler::new(source, CATALOG_URL)?;
        let store = Arc::new(PgGateway::new(config.connection_string.clone()));
        Self::new(sampler, store, config)
    }
}

impl<S: PageSource> Crawler<S> {
    pub fn new(
        sampler: CatalogSampler<S>,
        store: Arc<dyn ArtworkStore>,
        config: &CrawlConfig,
    ) -> CrawlResult<Self> {
        Ok(Self {
            sampler,
            store,
            fetcher: ImageFetcher::new(config)?,
            extractor: PaletteExtractor::new(config.palette.clone()),
            dry_run: false,
        })
    }

    /// Run every stage except the final insert
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// sample → select → fetch → extract → persist
    pub async fn run<P: IndexPicker + ?Sized>(&self, picker: &mut P) -> CrawlResult<RunReport> {
        info!(catalog = %self.sampler.base_url(), "Crawl start");

        let page = self.sampler.sample(picker).await?;
        let chosen_index =
            select_unseen(&page.entries, page.page, self.store.as_ref(), picker).await?;
        let entry = &page.entries[chosen_index];

        let bytes_downloaded = self.fetcher.fetch(&entry.image_link).await?;

        let palette = self.extractor.extract(self.fetcher.download_path()).await?;
        info!(
            width = palette.width,
            height = palette.height,
            colors = palette.colors.len(),
            "Palette extracted"
        );

        let record = ArtworkRecord::new(
            Some(&entry.title),
            Some(&entry.artist),
            entry.image_link.clone(),
            (palette.width, palette.height),
            palette.hex_codes(),
        );

        let rows_affected = if self.dry_run {
            info!(image_link = %record.image_link, "Dry run, skipping insert");
            0
        } else {
            let rows = self.store.insert(&record).await?;
            info!(image_link = %record.image_link, rows, "Artwork recorded");
            rows
        };

        Ok(RunReport {
            last_page: page.last_page,
            page: page.page,
            candidates: page.len(),
            chosen_index,
            bytes_downloaded,
            record,
            colors: palette.colors,
            rows_affected,
            dry_run: self.dry_run,
        })
    }
}
