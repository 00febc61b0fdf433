use serde::Deserialize;

/// Main configuration structure for Catalog-Refresh
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

/// The paginated catalog being ingested
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Root URL of the catalog site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of a listing page relative to `base_url`; `{page}` is replaced
    /// by the page number
    #[serde(rename = "page-path", default = "default_page_path")]
    pub page_path: String,

    /// Number of listing pages in the catalog
    #[serde(rename = "total-pages")]
    pub total_pages: u32,
}

/// Crawl timing and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Retries per listing page after the first attempt fails
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay (milliseconds), multiplied by the attempt number
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,

    /// Navigation timeout for every page load (milliseconds)
    #[serde(rename = "page-timeout", default = "default_page_timeout")]
    pub page_timeout: u64,

    /// Pause between successive detail-page fetches (milliseconds)
    #[serde(rename = "detail-delay", default = "default_detail_delay")]
    pub detail_delay: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            page_timeout: default_page_timeout(),
            detail_delay: default_detail_delay(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "CatalogRefresh".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Persistent store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Run the clear and save steps inside one transaction
    #[serde(default = "default_transactional")]
    pub transactional: bool,
}

/// Downstream cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379")
    #[serde(rename = "redis-url")]
    pub redis_url: String,

    /// How long to wait for the cache connection and for each flush (milliseconds)
    #[serde(rename = "connect-timeout", default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

fn default_page_path() -> String {
    "catalogue/page-{page}.html".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_page_timeout() -> u64 {
    30_000
}

fn default_detail_delay() -> u64 {
    100
}

fn default_transactional() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    2000
}
