//! Crawler module for catalog ingestion
//!
//! This module contains the core crawling logic, including:
//! - Extraction scripts for listing and detail pages
//! - Single-page crawling with enrichment and linear retry
//! - Range orchestration with per-page failure accounting

mod backoff;
mod extract;
mod orchestrator;
mod page;

pub use backoff::LinearBackoff;
pub use extract::{extract_detail, extract_listing, ListingExtraction};
pub use orchestrator::{IngestResult, Orchestrator};
pub use page::{CrawlSettings, PageCrawler, PageFetchError};

use crate::browser::BrowserLauncher;
use crate::config::Config;
use crate::CatalogError;

/// Builds an orchestrator for the configured catalog
///
/// # Arguments
///
/// * `config` - The refresh configuration
/// * `launcher` - Opens the browser session for each crawl pass
///
/// # Returns
///
/// * `Ok(Orchestrator)` - Ready to ingest
/// * `Err(CatalogError)` - The source settings could not be resolved
pub fn build_orchestrator<L: BrowserLauncher>(
    config: &Config,
    launcher: L,
) -> Result<Orchestrator<L>, CatalogError> {
    let settings = CrawlSettings::from_config(config)?;
    Ok(Orchestrator::new(
        launcher,
        PageCrawler::new(settings),
        config.source.total_pages,
    ))
}
