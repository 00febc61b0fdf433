//! Record types flowing through the ingestion pipeline
//!
//! Raw listing records are produced by the listing extraction, enriched once
//! with detail-page fields, and finally sanitized into canonical records that
//! the store persists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock text emitted for listing items carrying the in-stock marker
pub const IN_STOCK: &str = "In Stock";

/// Stock text emitted for listing items without the in-stock marker
pub const OUT_OF_STOCK: &str = "Out Of Stock";

/// Detail-page stock text used when the detail page could not be read
pub const UNKNOWN_STOCK_INFO: &str = "Unknown Stock Info";

/// One item as read from a catalog listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListingRecord {
    pub title: String,

    /// Price as displayed, including its currency prefix (e.g. "£51.77")
    pub price_text: String,

    /// Either [`IN_STOCK`] or [`OUT_OF_STOCK`]
    pub stock_text: String,

    /// Rating class word, passed through unmapped (e.g. "Three")
    pub rating_word: String,

    /// Absolute URL of the item's detail page
    pub detail_link: String,
}

/// Fields read from an item's detail page
#[derive(Debug, Clone, PartialEq)]
pub struct DetailFields {
    pub stock_info: String,
    pub image_link: Option<String>,
}

impl DetailFields {
    /// Defaults used when the detail page could not be visited or read
    pub fn unknown() -> Self {
        Self {
            stock_info: UNKNOWN_STOCK_INFO.to_string(),
            image_link: None,
        }
    }
}

/// A listing record enriched with its detail-page fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub listing: RawListingRecord,
    pub stock_info: String,
    pub image_link: Option<String>,
}

impl EnrichedRecord {
    /// Attaches detail fields to a listing record. Enrichment happens exactly once.
    pub fn enrich(listing: RawListingRecord, detail: DetailFields) -> Self {
        Self {
            listing,
            stock_info: detail.stock_info,
            image_link: detail.image_link,
        }
    }
}

/// The persisted, validated shape of a book
///
/// Invariants for every record produced by the sanitizer: `title` is
/// non-empty, `price > 0`, and `rating` is in `0..=5` where `0` flags an
/// unrecognized rating word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalBookRecord {
    pub title: String,
    pub price: f64,
    pub in_stock: bool,
    pub rating: u8,
    pub link: String,
    pub stock_info: String,
    pub image_link: Option<String>,
}

/// A catalog page that failed after exhausting its retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageErrorRecord {
    pub page_number: u32,
    pub message: String,
}

impl fmt::Display for PageErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}: {}", self.page_number, self.message)
    }
}
