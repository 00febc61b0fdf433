//! End-to-end refresh runs against a mock catalog site

use async_trait::async_trait;
use catalog_refresh::browser::HttpBrowserLauncher;
use catalog_refresh::cache::{CacheFlush, CacheStore};
use catalog_refresh::config::{parse_config, Config};
use catalog_refresh::output::load_statistics;
use catalog_refresh::pipeline::{PageRange, Pipeline};
use catalog_refresh::storage::{BookStore, CatalogQueries, RunHistory, SqliteStorage};
use catalog_refresh::CanonicalBookRecord;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Cache double that counts flushes
#[derive(Default)]
struct CountingCache {
    flushes: usize,
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn flush_all(&mut self) -> CacheFlush {
        self.flushes += 1;
        CacheFlush::Flushed
    }
}

/// Creates a test configuration for a catalog served at `base_url`
fn create_test_config(base_url: &str, total_pages: u32, db_path: &str) -> Config {
    parse_config(&format!(
        r#"
[source]
base-url = "{base_url}"
total-pages = {total_pages}

[crawler]
max-retries = 3
retry-delay = 5
page-timeout = 5000
detail-delay = 0

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"

[storage]
database-path = "{db_path}"
"#
    ))
    .expect("valid test config")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Listing page markup; each item is `(slug, title, price, rating)`
fn listing_page(items: &[(&str, &str, &str, &str)]) -> String {
    let pods: String = items
        .iter()
        .map(|(slug, title, price, rating)| {
            format!(
                r#"<li><article class="product_pod">
                    <p class="star-rating {rating}"><i class="icon-star"></i></p>
                    <h3><a href="{slug}/index.html" title="{title}">{title}</a></h3>
                    <div class="product_price">
                        <p class="price_color">{price}</p>
                        <p class="instock availability"><i class="icon-ok"></i> In stock</p>
                    </div>
                </article></li>"#
            )
        })
        .collect();
    format!(r#"<html><body><ol class="row">{pods}</ol></body></html>"#)
}

fn detail_page(slug: &str) -> String {
    format!(
        r#"<html><body>
            <div id="product_gallery"><div class="item active">
                <img src="../../media/cache/{slug}.jpg" alt="{slug}">
            </div></div>
            <p class="instock availability"><i class="icon-ok"></i>
                In stock (19 available)
            </p>
        </body></html>"#
    )
}

async fn mount_listing(server: &MockServer, page: u32, items: &[(&str, &str, &str, &str)]) {
    Mock::given(method("GET"))
        .and(path(format!("/catalogue/page-{page}.html")))
        .respond_with(html(listing_page(items)))
        .mount(server)
        .await;

    for (slug, ..) in items {
        Mock::given(method("GET"))
            .and(path(format!("/catalogue/{slug}/index.html")))
            .respond_with(html(detail_page(slug)))
            .mount(server)
            .await;
    }
}

fn seed_book(title: &str) -> CanonicalBookRecord {
    CanonicalBookRecord {
        title: title.to_string(),
        price: 9.99,
        in_stock: true,
        rating: 2,
        link: String::new(),
        stock_info: "Unknown".to_string(),
        image_link: None,
    }
}

#[tokio::test]
async fn test_end_to_end_refresh_with_retry_and_discard() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Page 2 fails twice before it succeeds; mounted first so it answers first
    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    mount_listing(
        &mock_server,
        1,
        &[
            ("light-attic", "A Light in the Attic", "£51.77", "Three"),
            ("velvet", "Tipping the Velvet", "£53.74", "One"),
        ],
    )
    .await;
    mount_listing(
        &mock_server,
        2,
        &[
            ("soumission", "Soumission", "no-price", "One"),
            ("sharp-objects", "Sharp Objects", "£47.82", "Four"),
        ],
    )
    .await;
    mount_listing(
        &mock_server,
        3,
        &[
            ("sapiens", "Sapiens", "£54.23", "Five"),
            ("requiem", "The Requiem Red", "$22.65", "One"),
        ],
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let config = create_test_config(&base_url, 3, db_path.to_str().unwrap());

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    storage
        .insert_many(&[seed_book("Stale 1"), seed_book("Stale 2")])
        .unwrap();
    let run_id = storage.create_run("test-hash").unwrap();
    let mut cache = CountingCache::default();

    let launcher = HttpBrowserLauncher::new(config.user_agent.clone());
    let pipeline = Pipeline::new(config, launcher).unwrap();
    let outcome = pipeline
        .refresh(&mut storage, Some(&mut cache), None)
        .await;

    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.books_scraped, 6);
    assert_eq!(outcome.page_errors, 0);
    assert_eq!(outcome.books_sanitized, 5);
    assert_eq!(outcome.discarded, 1);
    assert_eq!(outcome.deleted_count, 2);
    assert_eq!(outcome.books_saved, 5);
    assert!(outcome.cache_invalidated);
    assert_eq!(cache.flushes, 1);

    let books = storage.load_books().unwrap();
    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "A Light in the Attic",
            "Tipping the Velvet",
            "Sharp Objects",
            "Sapiens",
            "The Requiem Red"
        ]
    );

    let first = &books[0];
    assert_eq!(first.price, 51.77);
    assert_eq!(first.rating, 3);
    assert!(first.in_stock);
    assert_eq!(first.stock_info, "In stock (19 available)");
    assert_eq!(
        first.link,
        format!("{base_url}/catalogue/light-attic/index.html")
    );
    assert_eq!(
        first.image_link.as_deref(),
        Some(format!("{base_url}/media/cache/light-attic.jpg").as_str())
    );

    storage.finish_run(run_id, &outcome.run_summary()).unwrap();
    let statistics = load_statistics(&storage).unwrap();
    assert_eq!(statistics.stats.total_books, 5);
    assert_eq!(statistics.stats.in_stock, 5);
    assert_eq!(statistics.rating_distribution, vec![(1, 2), (3, 1), (4, 1), (5, 1)]);
    assert_eq!(statistics.recent_runs[0].books_saved, 5);
}

#[tokio::test]
async fn test_all_pages_failing_preserves_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let config = create_test_config(&mock_server.uri(), 2, db_path.to_str().unwrap());

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    storage.insert_many(&[seed_book("Keep me")]).unwrap();
    let mut cache = CountingCache::default();

    let launcher = HttpBrowserLauncher::new(config.user_agent.clone());
    let pipeline = Pipeline::new(config, launcher).unwrap();
    let outcome = pipeline
        .refresh(&mut storage, Some(&mut cache), None)
        .await;

    assert!(!outcome.success);
    assert_eq!(outcome.failed_stage.as_deref(), Some("INGEST"));
    assert_eq!(outcome.page_errors, 2);
    assert!(outcome.errors[0].contains("after 4 attempts"));
    assert_eq!(outcome.books_saved, 0);
    assert_eq!(cache.flushes, 0);
    assert_eq!(storage.count_books().unwrap(), 1);

    // 2 pages x 4 attempts
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 8);
}

#[tokio::test]
async fn test_detail_failures_use_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .respond_with(html(listing_page(&[("lost", "Lost Detail", "£12.00", "Two")])))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let config = create_test_config(&mock_server.uri(), 1, db_path.to_str().unwrap());

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let launcher = HttpBrowserLauncher::new(config.user_agent.clone());
    let pipeline = Pipeline::new(config, launcher).unwrap();
    let outcome = pipeline.refresh(&mut storage, None, None).await;

    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert!(!outcome.cache_invalidated);

    let books = storage.load_books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].stock_info, "Unknown Stock Info");
    assert_eq!(books[0].image_link, None);
}

#[tokio::test]
async fn test_sub_range_only_visits_requested_pages() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 2, &[("middle", "Middle Book", "£5.00", "Two")]).await;
    mount_listing(&mock_server, 3, &[("last", "Last Book", "£6.00", "Three")]).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let config = create_test_config(&mock_server.uri(), 5, db_path.to_str().unwrap());

    let launcher = HttpBrowserLauncher::new(config.user_agent.clone());
    let pipeline = Pipeline::new(config, launcher).unwrap();
    let scraped = pipeline
        .scrape(Some(PageRange { first: 2, last: 3 }))
        .await
        .unwrap();

    let titles: Vec<_> = scraped
        .report
        .books
        .iter()
        .map(|b| b.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Middle Book", "Last Book"]);
    assert!(scraped.ingest.errors.is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| r.url.path() != "/catalogue/page-1.html"));

    // Scraping never creates rows
    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_books().unwrap(), 0);
}
