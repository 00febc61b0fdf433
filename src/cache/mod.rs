//! Downstream cache invalidation
//!
//! A refresh replaces the whole catalog, so any cache in front of it is
//! flushed entirely once the new book set is committed. The cache is
//! optional: failing to connect or to flush is logged and never fails a run.

mod redis_cache;

pub use redis_cache::{CacheError, RedisCache};

use crate::config::CacheConfig;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of a flush attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheFlush {
    Flushed,
    Unavailable(String),
}

/// A cache that can be flushed entirely
#[async_trait]
pub trait CacheStore: Send {
    /// Flushes every entry; errors are reported in the returned value
    async fn flush_all(&mut self) -> CacheFlush;
}

/// Connects to the configured cache, tolerating failure
///
/// # Returns
///
/// * `Some(RedisCache)` - Connected
/// * `None` - The connection failed or timed out; the run continues without a cache
pub async fn connect_cache(config: &CacheConfig) -> Option<RedisCache> {
    let timeout = Duration::from_millis(config.connect_timeout);

    match RedisCache::connect(&config.redis_url, timeout).await {
        Ok(cache) => {
            tracing::info!("Connected to cache at {}", config.redis_url);
            Some(cache)
        }
        Err(e) => {
            tracing::warn!(
                "Cache unavailable, continuing without invalidation: {}",
                e
            );
            None
        }
    }
}
