use crate::cache::{CacheFlush, CacheStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while connecting to the cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Timed out connecting to {url} after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u128 },
}

/// Redis-backed cache, flushed with `FLUSHALL`
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisCache {
    /// Opens a managed connection, bounded by `timeout`
    ///
    /// # Arguments
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `timeout` - Upper bound on establishing the connection and on each flush
    pub async fn connect(redis_url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;

        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Timeout {
                url: redis_url.to_string(),
                timeout_ms: timeout.as_millis(),
            })??;

        Ok(Self { conn, timeout })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn flush_all(&mut self) -> CacheFlush {
        let mut cmd = redis::cmd("FLUSHALL");
        let flush = cmd.query_async::<_, ()>(&mut self.conn);

        match tokio::time::timeout(self.timeout, flush).await {
            Ok(Ok(())) => CacheFlush::Flushed,
            Ok(Err(e)) => CacheFlush::Unavailable(e.to_string()),
            Err(_) => CacheFlush::Unavailable(format!(
                "FLUSHALL timed out after {}ms",
                self.timeout.as_millis()
            )),
        }
    }
}
