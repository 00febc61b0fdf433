//! Browser capability traits and error types
//!
//! A browser session loads one page at a time and lets callers run DOM
//! queries against whatever is currently loaded. Sessions are handed out by
//! a launcher and must be closed by whoever launched them.

use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while driving a browser session
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No page is loaded in this session")]
    NoPage,

    #[error("Browser session is closed")]
    Closed,

    #[error("Failed to launch browser session: {0}")]
    Launch(String),
}

/// A single, exclusively owned browser session
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url`, waiting until the page has settled or `timeout` elapses
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<(), BrowserError>;

    /// URL of the currently loaded page, after redirects
    fn current_url(&self) -> Option<&Url>;

    /// Serialized DOM of the currently loaded page
    fn content(&self) -> Result<&str, BrowserError>;

    /// Releases the session. Navigation after closing fails with [`BrowserError::Closed`].
    async fn close(&mut self) -> Result<(), BrowserError>;

    /// Runs an extraction script against the loaded page
    ///
    /// The script receives the parsed document and the page URL (for
    /// resolving relative links) and returns plain records.
    fn extract<T, F>(&self, script: F) -> Result<T, BrowserError>
    where
        F: FnOnce(&Html, &Url) -> T,
        Self: Sized,
    {
        let url = self.current_url().ok_or(BrowserError::NoPage)?;
        let document = Html::parse_document(self.content()?);
        Ok(script(&document, url))
    }
}

/// Opens browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session, BrowserError>;
}
