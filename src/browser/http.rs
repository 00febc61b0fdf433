//! HTTP-backed browser session
//!
//! This adapter satisfies the browser capability with plain HTTP requests:
//! - A page counts as settled once its full response body has arrived
//! - Non-success status codes fail the navigation
//! - DOM queries run against the fetched markup through `scraper`

use crate::browser::{BrowserError, BrowserLauncher, BrowserSession};
use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// Per-request timeouts are applied on each navigation; the client only
/// bounds connection setup.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// The page currently loaded in a session
#[derive(Debug)]
struct LoadedPage {
    url: Url,
    body: String,
}

/// A browser session that loads pages over HTTP
#[derive(Debug)]
pub struct HttpBrowser {
    client: Client,
    page: Option<LoadedPage>,
    closed: bool,
}

impl HttpBrowser {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            page: None,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl BrowserSession for HttpBrowser {
    async fn navigate(&mut self, url: &Url, timeout: Duration) -> Result<(), BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }

        // A failed navigation leaves nothing loaded
        self.page = None;

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, timeout, e))?;

        tracing::debug!("Loaded {} ({} bytes)", final_url, body.len());
        self.page = Some(LoadedPage {
            url: final_url,
            body,
        });

        Ok(())
    }

    fn current_url(&self) -> Option<&Url> {
        self.page.as_ref().map(|page| &page.url)
    }

    fn content(&self) -> Result<&str, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        self.page
            .as_ref()
            .map(|page| page.body.as_str())
            .ok_or(BrowserError::NoPage)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.page = None;
        self.closed = true;
        tracing::debug!("Browser session closed");
        Ok(())
    }
}

/// Maps a transport error onto the browser error taxonomy
fn classify_error(url: &Url, timeout: Duration, error: reqwest::Error) -> BrowserError {
    if error.is_timeout() {
        BrowserError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis(),
        }
    } else if error.is_connect() {
        BrowserError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        BrowserError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Launches [`HttpBrowser`] sessions sharing one user agent
#[derive(Debug, Clone)]
pub struct HttpBrowserLauncher {
    user_agent: UserAgentConfig,
}

impl HttpBrowserLauncher {
    pub fn new(user_agent: UserAgentConfig) -> Self {
        Self { user_agent }
    }
}

#[async_trait]
impl BrowserLauncher for HttpBrowserLauncher {
    type Session = HttpBrowser;

    async fn launch(&self) -> Result<HttpBrowser, BrowserError> {
        let client = build_http_client(&self.user_agent)
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        tracing::debug!("Launched HTTP browser session");
        Ok(HttpBrowser::new(client))
    }
}
