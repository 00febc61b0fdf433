//! Configuration module for Catalog-Refresh
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use catalog_refresh::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("refresh.toml")).unwrap();
//! println!("Catalog has {} pages", config.source.total_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheConfig, Config, CrawlerConfig, SourceConfig, StorageConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
