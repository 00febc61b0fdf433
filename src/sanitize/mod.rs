//! Sanitizer - converts enriched records into canonical book records
//!
//! Sanitization never fails. Records that cannot satisfy the canonical
//! invariants are discarded with a reason; everything else is normalized.
//! Rules are applied in order and the first failing rule drops the record:
//!
//! | Rule | Outcome on failure |
//! |------|--------------------|
//! | title, price text and rating word are non-blank | `missing-field` |
//! | price text holds a positive number | `invalid-price` |
//! | rating word is One..Five | kept with rating 0, flagged |

mod price;
mod rating;

pub use price::parse_price;
pub use rating::{map_rating, UNRECOGNIZED_RATING};

use crate::records::{CanonicalBookRecord, EnrichedRecord, IN_STOCK};
use std::fmt;

/// Stock info stored when the enriched record carries none
pub const DEFAULT_STOCK_INFO: &str = "Unknown";

/// Why a record was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    MissingField,
    InvalidPrice,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField => write!(f, "missing-field"),
            Self::InvalidPrice => write!(f, "invalid-price"),
        }
    }
}

/// A dropped record
#[derive(Debug, Clone, PartialEq)]
pub struct Discard {
    /// Position of the record in the sanitizer input
    pub index: usize,
    pub title: String,
    pub reason: DiscardReason,
}

/// Sanitized books together with what was dropped or flagged
#[derive(Debug, Clone, Default)]
pub struct SanitizeReport {
    pub books: Vec<CanonicalBookRecord>,
    pub discarded: Vec<Discard>,

    /// Input indices of kept records whose rating word was not recognized
    pub unrecognized_ratings: Vec<usize>,
}

/// Sanitizes a batch of records, keeping input order
pub fn sanitize(records: &[EnrichedRecord]) -> Vec<CanonicalBookRecord> {
    sanitize_with_report(records).books
}

/// Sanitizes a batch of records and reports discards and flagged ratings
pub fn sanitize_with_report(records: &[EnrichedRecord]) -> SanitizeReport {
    let mut report = SanitizeReport {
        books: Vec::with_capacity(records.len()),
        ..SanitizeReport::default()
    };

    for (index, record) in records.iter().enumerate() {
        match sanitize_record(record) {
            Ok(book) => {
                if book.rating == UNRECOGNIZED_RATING {
                    tracing::warn!(
                        "unrecognized-rating: '{}' for book '{}', storing 0",
                        record.listing.rating_word,
                        book.title
                    );
                    report.unrecognized_ratings.push(index);
                }
                report.books.push(book);
            }
            Err(reason) => {
                tracing::warn!(
                    "Discarding record {} ('{}'): {}",
                    index,
                    record.listing.title.trim(),
                    reason
                );
                report.discarded.push(Discard {
                    index,
                    title: record.listing.title.trim().to_string(),
                    reason,
                });
            }
        }
    }

    tracing::info!(
        "Sanitized {} of {} records ({} discarded)",
        report.books.len(),
        records.len(),
        report.discarded.len()
    );

    report
}

/// Sanitizes a single record
pub fn sanitize_record(record: &EnrichedRecord) -> Result<CanonicalBookRecord, DiscardReason> {
    let listing = &record.listing;

    let title = listing.title.trim();
    if title.is_empty()
        || listing.price_text.trim().is_empty()
        || listing.rating_word.trim().is_empty()
    {
        return Err(DiscardReason::MissingField);
    }

    let price = parse_price(&listing.price_text).ok_or(DiscardReason::InvalidPrice)?;

    let stock_info = match record.stock_info.trim() {
        "" => DEFAULT_STOCK_INFO.to_string(),
        info => info.to_string(),
    };

    Ok(CanonicalBookRecord {
        title: title.to_string(),
        price,
        in_stock: listing.stock_text == IN_STOCK,
        rating: map_rating(&listing.rating_word),
        link: listing.detail_link.clone(),
        stock_info,
        image_link: record.image_link.clone(),
    })
}
