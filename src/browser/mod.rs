//! Browser capability for loading catalog pages
//!
//! This module contains:
//! - The session/launcher traits the crawler drives
//! - An HTTP-backed session implementation
//! - A scripted session for unit tests

mod http;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use http::{build_http_client, HttpBrowser, HttpBrowserLauncher};
pub use traits::{BrowserError, BrowserLauncher, BrowserSession};
