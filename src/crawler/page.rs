//! Single-page crawl with enrichment and retry
//!
//! One catalog page is crawled in two phases: the listing page is loaded and
//! extracted, then every listed item's detail page is visited to enrich it.
//! A failure to load or read the listing fails the attempt, and the whole
//! page is retried on a linear backoff. Detail-page failures never fail the
//! page; the item keeps default detail fields instead.

use crate::browser::{BrowserError, BrowserSession};
use crate::config::Config;
use crate::crawler::backoff::LinearBackoff;
use crate::crawler::extract::{extract_detail, extract_listing};
use crate::records::{DetailFields, EnrichedRecord, RawListingRecord};
use crate::ConfigError;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A page that failed on every attempt
#[derive(Debug, Error)]
#[error("Failed to ingest page {page_number} after {attempts} attempts: {source}")]
pub struct PageFetchError {
    pub page_number: u32,
    pub attempts: u32,
    #[source]
    pub source: BrowserError,
}

/// Resolved crawl settings
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub base_url: Url,
    pub page_path: String,
    pub backoff: LinearBackoff,
    pub page_timeout: Duration,
    pub detail_delay: Duration,
}

impl CrawlSettings {
    /// Resolves settings from configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut base = config.source.base_url.clone();
        // Without a trailing slash, joining would replace the last path segment
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

        Ok(Self {
            base_url,
            page_path: config.source.page_path.clone(),
            backoff: LinearBackoff::new(
                Duration::from_millis(config.crawler.retry_delay),
                config.crawler.max_retries,
            ),
            page_timeout: Duration::from_millis(config.crawler.page_timeout),
            detail_delay: Duration::from_millis(config.crawler.detail_delay),
        })
    }

    /// URL of listing page `page_number`
    pub fn page_url(&self, page_number: u32) -> Result<Url, BrowserError> {
        let path = self.page_path.replace("{page}", &page_number.to_string());
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| BrowserError::InvalidUrl(format!("{}{}: {}", self.base_url, path, e)))
    }
}

/// Crawls single catalog pages through a caller-owned browser session
#[derive(Debug, Clone)]
pub struct PageCrawler {
    settings: CrawlSettings,
}

impl PageCrawler {
    pub fn new(settings: CrawlSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Fetches and enriches every item on one catalog page
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Listing navigation fails (timeout, network, HTTP error) | Retry page |
    /// | Listing document unreadable | Retry page |
    /// | Item missing a required element | Drop item, continue |
    /// | Detail page fails | Default detail fields, continue |
    ///
    /// Retry `n` waits `retry_delay × n`. After `max_retries` retries the
    /// page fails with [`PageFetchError`].
    ///
    /// A page with no valid items yields an empty list, not an error.
    pub async fn fetch_page<S: BrowserSession>(
        &self,
        session: &mut S,
        page_number: u32,
    ) -> Result<Vec<EnrichedRecord>, PageFetchError> {
        let backoff = self.settings.backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match self.crawl_once(session, page_number).await {
                Ok(records) => return Ok(records),
                Err(error) => error,
            };

            tracing::warn!("Error ingesting page {}: {}", page_number, error);

            match backoff.delay(attempt) {
                Some(delay) => {
                    tracing::info!(
                        "Retrying page {} (attempt {}/{}) in {:?}",
                        page_number,
                        attempt,
                        backoff.max_retries(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(PageFetchError {
                        page_number,
                        attempts: attempt,
                        source: error,
                    });
                }
            }
        }
    }

    /// One attempt at a page: listing phase, then enrichment phase
    async fn crawl_once<S: BrowserSession>(
        &self,
        session: &mut S,
        page_number: u32,
    ) -> Result<Vec<EnrichedRecord>, BrowserError> {
        let url = self.settings.page_url(page_number)?;
        tracing::info!("Ingesting data from page {}...", page_number);

        session.navigate(&url, self.settings.page_timeout).await?;
        let listing = session.extract(extract_listing)?;

        if listing.dropped > 0 {
            tracing::warn!(
                "Dropped {} incomplete items on page {}",
                listing.dropped,
                page_number
            );
        }

        let mut records = Vec::with_capacity(listing.items.len());
        for (index, item) in listing.items.into_iter().enumerate() {
            if index > 0 && !self.settings.detail_delay.is_zero() {
                tokio::time::sleep(self.settings.detail_delay).await;
            }
            let detail = self.fetch_detail(session, &item).await;
            records.push(EnrichedRecord::enrich(item, detail));
        }

        tracing::info!(
            "Successfully ingested {} books from page {}",
            records.len(),
            page_number
        );
        Ok(records)
    }

    /// Visits an item's detail page; any failure yields default fields
    async fn fetch_detail<S: BrowserSession>(
        &self,
        session: &mut S,
        item: &RawListingRecord,
    ) -> DetailFields {
        let result: Result<DetailFields, BrowserError> = async {
            let url = Url::parse(&item.detail_link)
                .map_err(|e| BrowserError::InvalidUrl(format!("{}: {}", item.detail_link, e)))?;
            session.navigate(&url, self.settings.page_timeout).await?;
            session.extract(extract_detail)
        }
        .await;

        match result {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!("Error getting details for book '{}': {}", item.title, e);
                DetailFields::unknown()
            }
        }
    }
}
