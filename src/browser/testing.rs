//! Scripted browser session for unit tests
//!
//! Each URL maps to a queue of responses; the last response in a queue
//! repeats once the queue is drained. Unknown URLs answer HTTP 404.

use crate::browser::{BrowserError, BrowserLauncher, BrowserSession};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// A scripted response: page markup or a failing HTTP status
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Page(String),
    Status(u16),
}

#[derive(Debug, Default)]
struct Script {
    responses: HashMap<String, VecDeque<Scripted>>,
    visits: Vec<String>,
    visit_times: Vec<Instant>,
}

/// Shared handle to the script so tests can inspect visits afterwards
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedSite {
    script: Arc<Mutex<Script>>,
    closes: Arc<AtomicUsize>,
    launches: Arc<AtomicUsize>,
}

impl ScriptedSite {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(self, url: &str, html: impl Into<String>) -> Self {
        self.respond(url, Scripted::Page(html.into()))
    }

    pub(crate) fn respond(self, url: &str, response: Scripted) -> Self {
        self.script
            .lock()
            .unwrap()
            .responses
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub(crate) fn visits(&self) -> Vec<String> {
        self.script.lock().unwrap().visits.clone()
    }

    /// Clock readings taken at each navigation, in visit order
    pub(crate) fn visit_times(&self) -> Vec<Instant> {
        self.script.lock().unwrap().visit_times.clone()
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub(crate) fn session(&self) -> ScriptedSession {
        ScriptedSession {
            site: self.clone(),
            loaded: None,
            closed: false,
        }
    }
}

pub(crate) struct ScriptedSession {
    site: ScriptedSite,
    loaded: Option<(Url, String)>,
    closed: bool,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &Url, _timeout: Duration) -> Result<(), BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        self.loaded = None;

        let response = {
            let mut script = self.site.script.lock().unwrap();
            script.visits.push(url.to_string());
            script.visit_times.push(Instant::now());
            match script.responses.get_mut(url.as_str()) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match response {
            Some(Scripted::Page(html)) => {
                self.loaded = Some((url.clone(), html));
                Ok(())
            }
            Some(Scripted::Status(status)) => Err(BrowserError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(BrowserError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn current_url(&self) -> Option<&Url> {
        self.loaded.as_ref().map(|(url, _)| url)
    }

    fn content(&self) -> Result<&str, BrowserError> {
        self.loaded
            .as_ref()
            .map(|(_, html)| html.as_str())
            .ok_or(BrowserError::NoPage)
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.closed = true;
        self.site.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BrowserLauncher for ScriptedSite {
    type Session = ScriptedSession;

    async fn launch(&self) -> Result<ScriptedSession, BrowserError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(self.session())
    }
}

/// Listing page markup with one `.product_pod` per `(slug, title, price, rating)`
pub(crate) fn listing_html(items: &[(&str, &str, &str, &str)]) -> String {
    let pods: String = items
        .iter()
        .map(|(slug, title, price, rating)| {
            format!(
                r#"<article class="product_pod">
                    <p class="star-rating {rating}"></p>
                    <h3><a href="{slug}/index.html" title="{title}">{title}</a></h3>
                    <div class="product_price">
                        <p class="price_color">{price}</p>
                        <p class="instock availability">In stock</p>
                    </div>
                </article>"#
            )
        })
        .collect();
    format!("<html><body><ol class=\"row\">{pods}</ol></body></html>")
}

/// Detail page markup with a stock line and a cover image
pub(crate) fn detail_html(stock: &str, image_src: &str) -> String {
    format!(
        r#"<html><body>
            <div class="item active"><img src="{image_src}" alt="cover"></div>
            <p class="instock availability">
                {stock}
            </p>
        </body></html>"#
    )
}
