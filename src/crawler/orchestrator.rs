//! Ingestion orchestrator - drives the page crawler across a page range
//!
//! This module owns the crawl pass as a whole:
//! - Launching one browser session per pass and closing it on every exit path
//! - Crawling pages sequentially in ascending order
//! - Recording page failures without stopping the pass
//! - Deciding whether the pass produced any data at all

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::crawler::page::PageCrawler;
use crate::records::{EnrichedRecord, PageErrorRecord};
use crate::CatalogError;
use std::time::Instant;

/// Aggregate result of a crawl pass
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    /// Records from every successful page, in page order then listing order
    pub records: Vec<EnrichedRecord>,

    /// One entry per page that failed after exhausting its retries
    pub errors: Vec<PageErrorRecord>,

    /// Number of pages attempted
    pub pages_attempted: u32,
}

/// Main ingestion orchestrator structure
pub struct Orchestrator<L: BrowserLauncher> {
    launcher: L,
    crawler: PageCrawler,
    total_pages: u32,
}

impl<L: BrowserLauncher> Orchestrator<L> {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `launcher` - Opens the browser session for each crawl pass
    /// * `crawler` - Crawls individual pages
    /// * `total_pages` - Number of pages in the catalog, used by [`Self::ingest_all`]
    pub fn new(launcher: L, crawler: PageCrawler, total_pages: u32) -> Self {
        Self {
            launcher,
            crawler,
            total_pages,
        }
    }

    pub fn crawler(&self) -> &PageCrawler {
        &self.crawler
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Ingests every page of the catalog
    pub async fn ingest_all(&self) -> Result<IngestResult, CatalogError> {
        self.ingest_range(1, self.total_pages).await
    }

    /// Ingests a single page
    pub async fn ingest_page(&self, page_number: u32) -> Result<IngestResult, CatalogError> {
        self.ingest_range(page_number, page_number).await
    }

    /// Ingests pages `first..=last`
    ///
    /// Individual page failures are recorded in [`IngestResult::errors`] and
    /// never fail the pass. The pass fails with
    /// [`CatalogError::NoDataIngested`] only when no page produced a record.
    ///
    /// # Returns
    ///
    /// * `Ok(IngestResult)` - At least one record was ingested
    /// * `Err(CatalogError::InvalidPageRange)` - `first` is zero or after `last`
    /// * `Err(CatalogError::Browser)` - The session could not be launched
    /// * `Err(CatalogError::NoDataIngested)` - Every page was empty or failed
    pub async fn ingest_range(&self, first: u32, last: u32) -> Result<IngestResult, CatalogError> {
        if first == 0 || first > last {
            return Err(CatalogError::InvalidPageRange { first, last });
        }

        tracing::info!("Starting data ingestion for pages {}..={}", first, last);
        let mut session = self.launcher.launch().await?;

        let result = self.crawl_pages(&mut session, first, last).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }

        tracing::info!(
            "Data ingestion completed. Total books: {}",
            result.records.len()
        );
        if !result.errors.is_empty() {
            tracing::warn!("Encountered {} page errors", result.errors.len());
        }

        if result.records.is_empty() {
            return Err(CatalogError::NoDataIngested {
                first,
                last,
                errors: result.errors,
            });
        }

        Ok(result)
    }

    /// Crawls each page in order; never fails
    async fn crawl_pages(
        &self,
        session: &mut L::Session,
        first: u32,
        last: u32,
    ) -> IngestResult {
        let mut result = IngestResult::default();
        let start_time = Instant::now();

        for page_number in first..=last {
            result.pages_attempted += 1;

            match self.crawler.fetch_page(session, page_number).await {
                Ok(records) => result.records.extend(records),
                Err(e) => {
                    tracing::error!("Failed to ingest page {}: {}", page_number, e);
                    result.errors.push(PageErrorRecord {
                        page_number,
                        message: e.to_string(),
                    });
                }
            }

            if result.pages_attempted % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages attempted, {} books, {:.1}s elapsed",
                    result.pages_attempted,
                    result.records.len(),
                    start_time.elapsed().as_secs_f64()
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{detail_html, listing_html, Scripted, ScriptedSite};
    use crate::crawler::backoff::LinearBackoff;
    use crate::crawler::page::CrawlSettings;
    use std::time::Duration;
    use url::Url;

    const BASE: &str = "https://books.example/";

    fn crawler() -> PageCrawler {
        PageCrawler::new(CrawlSettings {
            base_url: Url::parse(BASE).unwrap(),
            page_path: "catalogue/page-{page}.html".to_string(),
            backoff: LinearBackoff::new(Duration::from_millis(1), 2),
            page_timeout: Duration::from_secs(1),
            detail_delay: Duration::ZERO,
        })
    }

    fn page(n: u32) -> String {
        format!("{BASE}catalogue/page-{n}.html")
    }

    fn with_page(site: ScriptedSite, n: u32) -> ScriptedSite {
        let first = format!("p{n}-a");
        let second = format!("p{n}-b");
        let first_title = format!("Book {n}A");
        let second_title = format!("Book {n}B");
        site.page(
            &page(n),
            listing_html(&[
                (first.as_str(), first_title.as_str(), "£10.00", "One"),
                (second.as_str(), second_title.as_str(), "£12.00", "Two"),
            ]),
        )
        .page(
            &format!("{BASE}catalogue/{first}/index.html"),
            detail_html("In stock", "a.jpg"),
        )
        .page(
            &format!("{BASE}catalogue/{second}/index.html"),
            detail_html("In stock", "b.jpg"),
        )
    }

    #[tokio::test]
    async fn test_ingest_range_preserves_page_order() {
        let site = with_page(with_page(with_page(ScriptedSite::new(), 1), 2), 3);
        let orchestrator = Orchestrator::new(site.clone(), crawler(), 3);

        let result = orchestrator.ingest_all().await.unwrap();

        let titles: Vec<_> = result.records.iter().map(|r| r.listing.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Book 1A", "Book 1B", "Book 2A", "Book 2B", "Book 3A", "Book 3B"]
        );
        assert!(result.errors.is_empty());
        assert_eq!(result.pages_attempted, 3);
        assert_eq!(site.launches(), 1);
        assert_eq!(site.closes(), 1);
    }

    #[tokio::test]
    async fn test_failed_page_is_recorded_and_skipped() {
        let site = with_page(with_page(ScriptedSite::new(), 1), 3)
            .respond(&page(2), Scripted::Status(500));
        let orchestrator = Orchestrator::new(site.clone(), crawler(), 3);

        let result = orchestrator.ingest_range(1, 3).await.unwrap();

        assert_eq!(result.records.len(), 4);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].page_number, 2);
        assert!(result.errors[0].message.contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_all_pages_failing_is_no_data() {
        let site = ScriptedSite::new();
        let orchestrator = Orchestrator::new(site.clone(), crawler(), 2);

        let error = orchestrator.ingest_all().await.unwrap_err();

        match error {
            CatalogError::NoDataIngested { first, last, errors } => {
                assert_eq!((first, last), (1, 2));
                assert_eq!(errors.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The session is released even though the pass failed
        assert_eq!(site.closes(), 1);
    }

    #[tokio::test]
    async fn test_ingest_single_page() {
        let site = with_page(with_page(ScriptedSite::new(), 1), 2);
        let orchestrator = Orchestrator::new(site.clone(), crawler(), 2);

        let result = orchestrator.ingest_page(2).await.unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].listing.title, "Book 2A");
        assert!(!site.visits().contains(&page(1)));
    }

    #[tokio::test]
    async fn test_invalid_range_rejected_before_launch() {
        let site = ScriptedSite::new();
        let orchestrator = Orchestrator::new(site.clone(), crawler(), 5);

        assert!(matches!(
            orchestrator.ingest_range(3, 2).await,
            Err(CatalogError::InvalidPageRange { first: 3, last: 2 })
        ));
        assert!(matches!(
            orchestrator.ingest_range(0, 2).await,
            Err(CatalogError::InvalidPageRange { .. })
        ));
        assert_eq!(site.launches(), 0);
    }
}
