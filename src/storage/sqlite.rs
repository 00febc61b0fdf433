//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the storage traits.
//! Transactions are driven explicitly through [`BookStore::begin`] so that a
//! caller can span several operations; bulk inserts additionally run inside a
//! savepoint and are therefore all-or-nothing on their own.

use crate::records::CanonicalBookRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    BookStore, CatalogQueries, RunHistory, StorageError, StorageResult,
};
use crate::storage::{CatalogStats, RunRecord, RunStatus, RunSummary};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, \
                           books_scraped, books_saved, page_errors, failed_stage";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

/// Turns SQLite constraint failures into [`StorageError::ConstraintViolation`]
fn classify(error: rusqlite::Error) -> StorageError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(
                message.clone().unwrap_or_else(|| failure.to_string()),
            )
        }
        _ => StorageError::Sqlite(error),
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Failed),
        books_scraped: row.get::<_, i64>(5)? as u64,
        books_saved: row.get::<_, i64>(6)? as u64,
        page_errors: row.get::<_, i64>(7)? as u64,
        failed_stage: row.get(8)?,
    })
}

impl BookStore for SqliteStorage {
    fn begin(&mut self) -> StorageResult<()> {
        if self.in_transaction() {
            return Err(StorageError::Transaction(
                "a transaction is already open".to_string(),
            ));
        }
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        if !self.in_transaction() {
            return Err(StorageError::Transaction(
                "no transaction to commit".to_string(),
            ));
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        if !self.in_transaction() {
            return Err(StorageError::Transaction(
                "no transaction to roll back".to_string(),
            ));
        }
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn delete_all(&mut self) -> StorageResult<u64> {
        let deleted = self.conn.execute("DELETE FROM books", [])?;
        Ok(deleted as u64)
    }

    fn insert_many(&mut self, books: &[CanonicalBookRecord]) -> StorageResult<u64> {
        let now = Utc::now().to_rfc3339();
        let savepoint = self.conn.savepoint()?;

        let mut inserted = 0u64;
        {
            let mut stmt = savepoint.prepare(
                "INSERT INTO books (title, price, in_stock, rating, link, stock_info,
                 image_link, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            )?;

            for book in books {
                stmt.execute(params![
                    book.title,
                    book.price,
                    book.in_stock,
                    book.rating,
                    book.link,
                    book.stock_info,
                    book.image_link,
                    now,
                ])
                .map_err(classify)?;
                inserted += 1;
            }
        }

        savepoint.commit()?;
        Ok(inserted)
    }

    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl CatalogQueries for SqliteStorage {
    fn load_books(&self) -> StorageResult<Vec<CanonicalBookRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, price, in_stock, rating, link, stock_info, image_link
             FROM books ORDER BY id",
        )?;

        let books = stmt
            .query_map([], |row| {
                Ok(CanonicalBookRecord {
                    title: row.get(0)?,
                    price: row.get(1)?,
                    in_stock: row.get(2)?,
                    rating: row.get(3)?,
                    link: row.get(4)?,
                    stock_info: row.get(5)?,
                    image_link: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(books)
    }

    fn catalog_stats(&self) -> StorageResult<CatalogStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*), AVG(price), MIN(price), MAX(price), COALESCE(SUM(in_stock), 0)
             FROM books",
            [],
            |row| {
                Ok(CatalogStats {
                    total_books: row.get::<_, i64>(0)? as u64,
                    average_price: row.get(1)?,
                    min_price: row.get(2)?,
                    max_price: row.get(3)?,
                    in_stock: row.get::<_, i64>(4)? as u64,
                })
            },
        )?;
        Ok(stats)
    }

    fn rating_distribution(&self) -> StorageResult<Vec<(u8, u64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT rating, COUNT(*) FROM books GROUP BY rating ORDER BY rating")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

impl RunHistory for SqliteStorage {
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO refresh_runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE refresh_runs
             SET status = ?1, finished_at = ?2, books_scraped = ?3, books_saved = ?4,
                 page_errors = ?5, failed_stage = ?6
             WHERE id = ?7",
            params![
                summary.status.to_db_string(),
                now,
                summary.books_scraped as i64,
                summary.books_saved as i64,
                summary.page_errors as i64,
                summary.failed_stage,
                run_id,
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {RUN_COLUMNS} FROM refresh_runs WHERE id = ?1"))?;

        stmt.query_row(params![run_id], run_from_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StorageError::RunNotFound(run_id),
                other => StorageError::Sqlite(other),
            })
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RUN_COLUMNS} FROM refresh_runs ORDER BY id DESC LIMIT ?1"
        ))?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }
}
