//! Catalog-Refresh: a replace-all ingestion pipeline for paginated book catalogs
//!
//! This crate crawls a paginated catalog site (listing pages plus one detail
//! page per item), sanitizes the scraped records into a canonical schema, and
//! refreshes a SQLite store in a clear-then-save sequence before flushing any
//! downstream cache.

pub mod browser;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod refresh;
pub mod sanitize;
pub mod storage;

use thiserror::Error;

/// Main error type for Catalog-Refresh operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Invalid page range: {first}..={last}")]
    InvalidPageRange { first: u32, last: u32 },

    #[error("No books were ingested from pages {first}..={last} ({} page errors)", errors.len())]
    NoDataIngested {
        first: u32,
        last: u32,
        errors: Vec<records::PageErrorRecord>,
    },

    #[error("No valid books after sanitization ({discarded} discarded)")]
    NoValidBooks { discarded: usize },

    #[error("Refusing to refresh the store with an empty book set")]
    EmptyRefresh,

    #[error("Refresh aborted at stage {stage}: {source}")]
    RefreshAborted {
        stage: refresh::RefreshStage,
        deleted_count: Option<u64>,
        #[source]
        source: storage::StorageError,
    },

    #[error("Invalid refresh transition: {from} -> {to}")]
    InvalidTransition {
        from: refresh::RefreshStage,
        to: refresh::RefreshStage,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

impl CatalogError {
    /// Name of the pipeline stage this error aborted, as shown in run summaries
    pub fn stage_name(&self) -> String {
        match self {
            Self::Config(_) => "CONFIG".to_string(),
            Self::Browser(_) | Self::InvalidPageRange { .. } | Self::NoDataIngested { .. } => {
                "INGEST".to_string()
            }
            Self::NoValidBooks { .. } => "SANITIZE".to_string(),
            Self::EmptyRefresh => refresh::RefreshStage::Save.to_string(),
            Self::RefreshAborted { stage, .. } => stage.to_string(),
            Self::InvalidTransition { .. } => refresh::RefreshStage::Failed.to_string(),
            Self::Storage(_) => "STORAGE".to_string(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Refresh operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use output::RefreshOutcome;
pub use pipeline::Pipeline;
pub use records::{CanonicalBookRecord, EnrichedRecord, PageErrorRecord, RawListingRecord};
pub use sanitize::sanitize;
