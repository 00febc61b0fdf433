//! Statistics generation from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics and recent refresh runs from the storage layer.

use crate::storage::{CatalogQueries, CatalogStats, RunHistory, RunRecord, StorageResult};

/// Number of past runs shown with the statistics
pub const RECENT_RUNS: usize = 5;

/// Catalog statistics summary
#[derive(Debug, Clone)]
pub struct CatalogStatistics {
    /// Price and stock aggregates
    pub stats: CatalogStats,

    /// Book count per rating, ascending
    pub rating_distribution: Vec<(u8, u64)>,

    /// Most recent refresh runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics<S>(storage: &S) -> StorageResult<CatalogStatistics>
where
    S: CatalogQueries + RunHistory,
{
    Ok(CatalogStatistics {
        stats: storage.catalog_stats()?,
        rating_distribution: storage.rating_distribution()?,
        recent_runs: storage.recent_runs(RECENT_RUNS)?,
    })
}

fn format_price(price: Option<f64>) -> String {
    price
        .map(|p| format!("{:.2}", p))
        .unwrap_or_else(|| "-".to_string())
}

/// Formats statistics for display
pub fn format_statistics(statistics: &CatalogStatistics) -> String {
    let stats = &statistics.stats;
    let mut out = String::from("=== Catalog Statistics ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  Total books: {}\n", stats.total_books));
    out.push_str(&format!("  Average price: {}\n", format_price(stats.average_price)));
    out.push_str(&format!("  Min price: {}\n", format_price(stats.min_price)));
    out.push_str(&format!("  Max price: {}\n", format_price(stats.max_price)));

    let in_stock_rate = if stats.total_books > 0 {
        (stats.in_stock as f64 / stats.total_books as f64) * 100.0
    } else {
        0.0
    };
    out.push_str(&format!(
        "  In stock: {} ({:.1}%)\n\n",
        stats.in_stock, in_stock_rate
    ));

    if !statistics.rating_distribution.is_empty() {
        out.push_str("Rating Distribution:\n");
        for (rating, count) in &statistics.rating_distribution {
            let label = if *rating == 0 {
                "unrated".to_string()
            } else {
                format!("{} star", rating)
            };
            out.push_str(&format!("  {}: {}\n", label, count));
        }
        out.push('\n');
    }

    if !statistics.recent_runs.is_empty() {
        out.push_str(&format!("Recent Runs ({}):\n", statistics.recent_runs.len()));
        for run in &statistics.recent_runs {
            out.push_str(&format!(
                "  #{} {} {} scraped={} saved={} page_errors={}",
                run.id,
                run.started_at,
                run.status.to_db_string(),
                run.books_scraped,
                run.books_saved,
                run.page_errors
            ));
            if let Some(stage) = &run.failed_stage {
                out.push_str(&format!(" failed_stage={}", stage));
            }
            out.push('\n');
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(statistics: &CatalogStatistics) {
    print!("{}", format_statistics(statistics));
}
