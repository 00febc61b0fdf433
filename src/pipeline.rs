//! Pipeline driver - one refresh run from crawl to cache invalidation
//!
//! The pipeline owns the configuration and the orchestrator. The store and
//! the optional cache are owned by the caller and lent for the run:
//!
//! ```text
//! ingest_range ──> sanitize ──> CLEAR ──> SAVE ──> INVALIDATE_CACHE
//! ```
//!
//! Every run produces a [`RefreshOutcome`], including runs that fail, so
//! the caller can always print a summary and record the run.

use crate::browser::BrowserLauncher;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::crawler::{build_orchestrator, IngestResult, Orchestrator};
use crate::output::RefreshOutcome;
use crate::refresh::{RefreshCoordinator, RefreshMode};
use crate::sanitize::{sanitize_with_report, SanitizeReport};
use crate::storage::{BookStore, RunHistory};
use crate::CatalogError;
use std::time::Instant;
use url::Url;

/// Inclusive range of catalog pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

/// Records from a crawl that were scraped and sanitized but not stored
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub ingest: IngestResult,
    pub report: SanitizeReport,
}

/// Drives refresh runs for one configured catalog
pub struct Pipeline<L: BrowserLauncher> {
    config: Config,
    orchestrator: Orchestrator<L>,
}

impl<L: BrowserLauncher> Pipeline<L> {
    /// Creates a pipeline for `config`, crawling through `launcher`
    pub fn new(config: Config, launcher: L) -> Result<Self, CatalogError> {
        let orchestrator = build_orchestrator(&config, launcher)?;
        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// The configured range, or every page when `range` is `None`
    pub fn resolve_range(&self, range: Option<PageRange>) -> PageRange {
        range.unwrap_or(PageRange {
            first: 1,
            last: self.orchestrator.total_pages(),
        })
    }

    /// Listing URLs a run over `range` would visit
    pub fn page_urls(&self, range: Option<PageRange>) -> Result<Vec<Url>, CatalogError> {
        let PageRange { first, last } = self.resolve_range(range);
        if first == 0 || first > last {
            return Err(CatalogError::InvalidPageRange { first, last });
        }

        let settings = self.orchestrator.crawler().settings();
        (first..=last)
            .map(|page| settings.page_url(page).map_err(CatalogError::from))
            .collect()
    }

    /// Crawls and sanitizes without touching the store or the cache
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeResult)` - At least one valid book
    /// * `Err(CatalogError::NoDataIngested)` - Every page failed or was empty
    /// * `Err(CatalogError::NoValidBooks)` - Nothing survived sanitization
    pub async fn scrape(&self, range: Option<PageRange>) -> Result<ScrapeResult, CatalogError> {
        let PageRange { first, last } = self.resolve_range(range);
        let ingest = self.orchestrator.ingest_range(first, last).await?;
        let report = sanitize_with_report(&ingest.records);

        if report.books.is_empty() {
            return Err(CatalogError::NoValidBooks {
                discarded: report.discarded.len(),
            });
        }

        Ok(ScrapeResult { ingest, report })
    }

    /// Runs a full refresh and reports how it went
    ///
    /// Never fails: a fatal error is recorded in the outcome together with
    /// the stage it aborted and the progress made before it.
    pub async fn refresh<'a>(
        &self,
        store: &'a mut dyn BookStore,
        cache: Option<&'a mut dyn CacheStore>,
        range: Option<PageRange>,
    ) -> RefreshOutcome {
        let start = Instant::now();
        let mut outcome = RefreshOutcome::started();
        tracing::info!("Starting book data refresh at {}", outcome.started_at);

        match self.run(&mut outcome, store, cache, range).await {
            Ok(()) => {
                outcome.succeed(start.elapsed());
                tracing::info!(
                    "Data refresh completed: {} scraped, {} saved in {:.2}s",
                    outcome.books_scraped,
                    outcome.books_saved,
                    outcome.duration_seconds
                );
            }
            Err(e) => {
                outcome.fail(&e, start.elapsed());
                tracing::error!("Data refresh failed at stage {}: {}", e.stage_name(), e);
            }
        }

        outcome
    }

    /// Runs a full refresh and records it in the store's run history
    ///
    /// The history row is created only once the run is about to start and is
    /// always finished with the outcome. History failures are logged and never
    /// affect the outcome.
    pub async fn refresh_recorded<S>(
        &self,
        store: &mut S,
        cache: Option<&mut dyn CacheStore>,
        range: Option<PageRange>,
        config_hash: &str,
    ) -> RefreshOutcome
    where
        S: BookStore + RunHistory,
    {
        let run_id = match store.create_run(config_hash) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Failed to record run start: {}", e);
                None
            }
        };

        let cache = cache.map(|c| c as &mut dyn CacheStore);
        let outcome = self.refresh(&mut *store, cache, range).await;

        if let Some(run_id) = run_id {
            if let Err(e) = store.finish_run(run_id, &outcome.run_summary()) {
                tracing::warn!("Failed to record run {}: {}", run_id, e);
            }
        }

        outcome
    }

    async fn run<'a>(
        &self,
        outcome: &mut RefreshOutcome,
        store: &'a mut dyn BookStore,
        cache: Option<&'a mut dyn CacheStore>,
        range: Option<PageRange>,
    ) -> Result<(), CatalogError> {
        let PageRange { first, last } = self.resolve_range(range);

        let ingest = match self.orchestrator.ingest_range(first, last).await {
            Ok(ingest) => ingest,
            Err(e) => {
                if let CatalogError::NoDataIngested { errors, .. } = &e {
                    outcome.page_errors = errors.len();
                    outcome.errors.extend(errors.iter().map(ToString::to_string));
                }
                return Err(e);
            }
        };
        outcome.books_scraped = ingest.records.len();
        outcome.page_errors = ingest.errors.len();
        outcome
            .errors
            .extend(ingest.errors.iter().map(ToString::to_string));

        let report = sanitize_with_report(&ingest.records);
        outcome.books_sanitized = report.books.len();
        outcome.discarded = report.discarded.len();
        outcome.unrecognized_ratings = report.unrecognized_ratings.len();

        if report.books.is_empty() {
            return Err(CatalogError::NoValidBooks {
                discarded: report.discarded.len(),
            });
        }

        let mode = RefreshMode::from_config(&self.config.storage);
        match RefreshCoordinator::new(store, cache, mode)
            .refresh(&report.books)
            .await
        {
            Ok(refreshed) => {
                outcome.deleted_count = refreshed.deleted_count;
                outcome.books_saved = refreshed.saved_count;
                outcome.cache_invalidated = refreshed.cache_invalidated;
                Ok(())
            }
            Err(e) => {
                if let CatalogError::RefreshAborted {
                    deleted_count: Some(count),
                    ..
                } = &e
                {
                    outcome.deleted_count = *count;
                }
                Err(e)
            }
        }
    }
}
