//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the catalog database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Current catalog contents, replaced wholesale by every refresh
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    price REAL NOT NULL CHECK (price > 0),
    in_stock INTEGER NOT NULL DEFAULT 0,
    rating INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5),
    link TEXT NOT NULL DEFAULT '',
    stock_info TEXT NOT NULL DEFAULT 'Unknown',
    image_link TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_books_rating ON books(rating);
CREATE INDEX IF NOT EXISTS idx_books_in_stock ON books(in_stock);

-- Track refresh runs
CREATE TABLE IF NOT EXISTS refresh_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    books_scraped INTEGER NOT NULL DEFAULT 0,
    books_saved INTEGER NOT NULL DEFAULT 0,
    page_errors INTEGER NOT NULL DEFAULT 0,
    failed_stage TEXT
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
