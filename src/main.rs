//! Catalog-Refresh main entry point
//!
//! This is the command-line interface for the catalog refresh pipeline.

use anyhow::Context;
use catalog_refresh::browser::HttpBrowserLauncher;
use catalog_refresh::cache::{connect_cache, CacheStore};
use catalog_refresh::config::{load_config_with_hash, Config};
use catalog_refresh::output::{load_statistics, print_outcome, print_statistics, RefreshOutcome};
use catalog_refresh::pipeline::{PageRange, Pipeline};
use catalog_refresh::storage::SqliteStorage;
use catalog_refresh::CatalogError;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Catalog-Refresh: replace-all ingestion for paginated book catalogs
///
/// Crawls every listing page of the configured catalog, enriches each book
/// from its detail page, sanitizes the results, replaces the stored catalog,
/// and flushes the downstream cache.
#[derive(Parser, Debug)]
#[command(name = "catalog-refresh")]
#[command(version)]
#[command(about = "Replace-all ingestion pipeline for paginated book catalogs", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "scrape_only"])]
    dry_run: bool,

    /// Show catalog statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "scrape_only"])]
    stats: bool,

    /// Crawl and sanitize, print the books as JSON, leave the store untouched
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    scrape_only: bool,

    /// First page to crawl (default: 1)
    #[arg(long, value_name = "PAGE")]
    from: Option<u32>,

    /// Last page to crawl (default: the configured total)
    #[arg(long, value_name = "PAGE")]
    to: Option<u32>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return report_early_failure(CatalogError::from(e), cli.json);
        }
    };

    let range = page_range(&cli, &config);

    let result = if cli.dry_run {
        handle_dry_run(config, range)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.scrape_only {
        handle_scrape_only(config, range).await
    } else {
        return handle_refresh(config, &config_hash, range, cli.json).await;
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_refresh=info,warn"),
            1 => EnvFilter::new("catalog_refresh=debug,info"),
            2 => EnvFilter::new("catalog_refresh=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// `--from`/`--to` as a page range; `None` means every page
fn page_range(cli: &Cli, config: &Config) -> Option<PageRange> {
    if cli.from.is_none() && cli.to.is_none() {
        return None;
    }
    Some(PageRange {
        first: cli.from.unwrap_or(1),
        last: cli.to.unwrap_or(config.source.total_pages),
    })
}

/// Prints a failed summary for errors raised before the pipeline starts
fn report_early_failure(error: CatalogError, json: bool) -> ExitCode {
    let mut outcome = RefreshOutcome::started();
    outcome.fail(&error, Duration::ZERO);
    print_outcome(&outcome, json);
    ExitCode::FAILURE
}

fn build_pipeline(config: Config) -> Result<Pipeline<HttpBrowserLauncher>, CatalogError> {
    let launcher = HttpBrowserLauncher::new(config.user_agent.clone());
    Pipeline::new(config, launcher)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: Config, range: Option<PageRange>) -> anyhow::Result<()> {
    println!("=== Catalog-Refresh Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Page path: {}", config.source.page_path);
    println!("  Total pages: {}", config.source.total_pages);

    println!("\nCrawler:");
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Retry delay: {}ms", config.crawler.retry_delay);
    println!("  Page timeout: {}ms", config.crawler.page_timeout);
    println!("  Detail delay: {}ms", config.crawler.detail_delay);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Transactional: {}", config.storage.transactional);

    match &config.cache {
        Some(cache) => println!("\nCache: {}", cache.redis_url),
        None => println!("\nCache: none"),
    }

    let pipeline = build_pipeline(config)?;
    let urls = pipeline.page_urls(range)?;

    println!("\nPages ({}):", urls.len());
    for url in urls.iter().take(3) {
        println!("  - {}", url);
    }
    if urls.len() > 4 {
        println!("  ... {} more", urls.len() - 4);
    }
    if urls.len() > 3 {
        if let Some(last) = urls.last() {
            println!("  - {}", last);
        }
    }

    println!("\nConfiguration is valid");
    println!("Would crawl {} listing pages", urls.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))
        .with_context(|| format!("Failed to open {}", config.storage.database_path))?;

    let stats = load_statistics(&storage).context("Failed to load statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --scrape-only mode: prints sanitized books as JSON
async fn handle_scrape_only(config: Config, range: Option<PageRange>) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let scraped = pipeline.scrape(range).await?;

    tracing::info!(
        "Scraped {} books ({} page errors, {} discarded)",
        scraped.ingest.records.len(),
        scraped.ingest.errors.len(),
        scraped.report.discarded.len()
    );

    println!("{}", serde_json::to_string_pretty(&scraped.report.books)?);
    Ok(())
}

/// Handles the main refresh run
async fn handle_refresh(
    config: Config,
    config_hash: &str,
    range: Option<PageRange>,
    json: bool,
) -> ExitCode {
    let database_path = PathBuf::from(&config.storage.database_path);
    let cache_config = config.cache.clone();

    let pipeline = match build_pipeline(config) {
        Ok(pipeline) => pipeline,
        Err(e) => return report_early_failure(e, json),
    };

    let mut storage = match SqliteStorage::new(&database_path) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Failed to open database {}: {}", database_path.display(), e);
            return report_early_failure(CatalogError::from(e), json);
        }
    };

    let mut cache = match &cache_config {
        Some(cache_config) => connect_cache(cache_config).await,
        None => {
            tracing::info!("No cache configured, invalidation will be skipped");
            None
        }
    };

    let outcome = pipeline
        .refresh_recorded(
            &mut storage,
            cache.as_mut().map(|c| c as &mut dyn CacheStore),
            range,
            config_hash,
        )
        .await;

    print_outcome(&outcome, json);

    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
