//! Extraction scripts for catalog pages
//!
//! These run against a loaded document and return plain records:
//! - Listing pages yield one raw record per `.product_pod`
//! - Detail pages yield the stock line and the cover image

use crate::records::{DetailFields, RawListingRecord, IN_STOCK, OUT_OF_STOCK, UNKNOWN_STOCK_INFO};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static PRODUCT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".product_pod").expect("valid selector"));
static TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3 a").expect("valid selector"));
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price_color").expect("valid selector"));
static IN_STOCK_MARKER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".instock.availability").expect("valid selector"));
static RATING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".star-rating").expect("valid selector"));
static COVER_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".item.active img").expect("valid selector"));

/// Items read from one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingExtraction {
    /// Items with every required element present, in listing order
    pub items: Vec<RawListingRecord>,

    /// Number of items skipped because a required element was missing
    pub dropped: usize,
}

/// Extracts every catalog item from a listing page
///
/// # Field Sources
///
/// | Field | Source |
/// |-------|--------|
/// | title | `title` attribute of `h3 a` |
/// | price text | text of `.price_color` |
/// | stock text | presence of `.instock.availability` |
/// | rating word | second class of `.star-rating` |
/// | detail link | `href` of `h3 a`, resolved against the page URL |
///
/// Items without a title link, price, rating element, or resolvable detail
/// link are dropped and counted. Rating words are not interpreted here.
pub fn extract_listing(document: &Html, page_url: &Url) -> ListingExtraction {
    let mut extraction = ListingExtraction::default();

    for (index, product) in document.select(&PRODUCT).enumerate() {
        match extract_item(product, page_url) {
            Some(item) => extraction.items.push(item),
            None => {
                tracing::warn!(
                    "Skipping item {} on {}: missing required book elements",
                    index,
                    page_url
                );
                extraction.dropped += 1;
            }
        }
    }

    extraction
}

fn extract_item(product: ElementRef<'_>, page_url: &Url) -> Option<RawListingRecord> {
    let title_link = product.select(&TITLE_LINK).next()?;
    let price = product.select(&PRICE).next()?;
    let rating = product.select(&RATING).next()?;

    let detail_link = title_link
        .value()
        .attr("href")
        .and_then(|href| resolve_link(href, page_url))?;

    let title = title_link.value().attr("title").unwrap_or_default();

    let rating_word = rating
        .value()
        .attr("class")
        .and_then(|classes| classes.split_whitespace().nth(1))
        .unwrap_or_default();

    let stock_text = if product.select(&IN_STOCK_MARKER).next().is_some() {
        IN_STOCK
    } else {
        OUT_OF_STOCK
    };

    Some(RawListingRecord {
        title: title.to_string(),
        price_text: element_text(price),
        stock_text: stock_text.to_string(),
        rating_word: rating_word.to_string(),
        detail_link,
    })
}

/// Extracts the stock line and cover image from a detail page
///
/// Missing elements fall back to [`UNKNOWN_STOCK_INFO`] and no image.
pub fn extract_detail(document: &Html, page_url: &Url) -> DetailFields {
    let stock_info = document
        .select(&IN_STOCK_MARKER)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNKNOWN_STOCK_INFO.to_string());

    let image_link = document
        .select(&COVER_IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| resolve_link(src, page_url));

    DetailFields {
        stock_info,
        image_link,
    }
}

/// Rendered text of an element with runs of whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves an attribute value to an absolute http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
