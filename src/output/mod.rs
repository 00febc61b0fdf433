//! Output module for run summaries and catalog reports
//!
//! This module handles:
//! - The per-run outcome, printed as text or JSON
//! - Catalog statistics and refresh history from the database

pub mod stats;
mod summary;

pub use stats::{format_statistics, load_statistics, print_statistics, CatalogStatistics};
pub use summary::{format_summary, print_outcome, RefreshOutcome};
