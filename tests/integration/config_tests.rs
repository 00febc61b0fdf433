//! Configuration files loaded from disk

use catalog_refresh::config::{compute_config_hash, load_config, load_config_with_hash};
use catalog_refresh::ConfigError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MINIMAL: &str = r#"
[source]
base-url = "https://books.toscrape.com"
total-pages = 50

[storage]
database-path = "./data/books.db"
"#;

#[test]
fn test_minimal_config_uses_defaults() {
    let file = write_config(MINIMAL);

    let (config, hash) = load_config_with_hash(file.path()).unwrap();

    assert_eq!(config.crawler.max_retries, 3);
    assert_eq!(config.crawler.retry_delay, 2000);
    assert_eq!(config.crawler.page_timeout, 30_000);
    assert_eq!(config.crawler.detail_delay, 100);
    assert!(config.storage.transactional);
    assert!(config.cache.is_none());
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_hash_tracks_file_content() {
    let first = write_config(MINIMAL);
    let second = write_config(&MINIMAL.replace("total-pages = 50", "total-pages = 10"));

    assert_eq!(
        compute_config_hash(first.path()).unwrap(),
        compute_config_hash(first.path()).unwrap()
    );
    assert_ne!(
        compute_config_hash(first.path()).unwrap(),
        compute_config_hash(second.path()).unwrap()
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    let file = write_config(&MINIMAL.replace("total-pages = 50", "total-pages = 0"));

    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_malformed_toml_is_rejected() {
    let file = write_config("[source\nbase-url = ");

    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_file() {
    let result = load_config(std::path::Path::new("/nonexistent/refresh.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
