//! Storage module for persisting the catalog
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - The replace-all book set (clear, bulk insert, transactions)
//! - Catalog statistics
//! - Refresh run history

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{BookStore, CatalogQueries, RunHistory, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Aggregate figures over the persisted books
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CatalogStats {
    pub total_books: u64,
    pub average_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: u64,
}

/// Represents a refresh run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub books_scraped: u64,
    pub books_saved: u64,
    pub page_errors: u64,
    pub failed_stage: Option<String>,
}

/// Final figures written back to a run row
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub books_scraped: u64,
    pub books_saved: u64,
    pub page_errors: u64,
    pub failed_stage: Option<String>,
}

/// Status of a refresh run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
