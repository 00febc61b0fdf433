//! Storage traits and error types
//!
//! This module defines the trait interfaces for storage backends and
//! associated error types. The refresh path only needs [`BookStore`]; the
//! statistics and run-history reads live in their own traits.

use crate::records::CanonicalBookRecord;
use crate::storage::{CatalogStats, RunRecord, RunSummary};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The persisted book set
///
/// Implementations fail loudly and never retry internally.
pub trait BookStore: Send {
    /// Opens a transaction spanning subsequent calls until commit or rollback
    fn begin(&mut self) -> StorageResult<()>;

    /// Commits the open transaction
    fn commit(&mut self) -> StorageResult<()>;

    /// Rolls back the open transaction
    fn rollback(&mut self) -> StorageResult<()>;

    /// Deletes every persisted book
    ///
    /// # Returns
    ///
    /// The number of rows deleted
    fn delete_all(&mut self) -> StorageResult<u64>;

    /// Inserts all books, or none of them
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    fn insert_many(&mut self, books: &[CanonicalBookRecord]) -> StorageResult<u64>;

    /// Counts persisted books
    fn count_books(&self) -> StorageResult<u64>;
}

/// Read-only queries over the catalog
pub trait CatalogQueries {
    /// Loads every book in insertion order
    fn load_books(&self) -> StorageResult<Vec<CanonicalBookRecord>>;

    /// Aggregate price and stock figures
    fn catalog_stats(&self) -> StorageResult<CatalogStats>;

    /// Book count per rating, ascending by rating; absent ratings are omitted
    fn rating_distribution(&self) -> StorageResult<Vec<(u8, u64)>>;
}

/// History of refresh runs
pub trait RunHistory {
    /// Creates a new refresh run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records the final status and counts of a run
    fn finish_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}
