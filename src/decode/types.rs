//! Decoder types and traits
//!
//! Defines the page envelope the bookings endpoint answers with.

use crate::error::Result;
use crate::types::JsonObject;

/// Where the records and page metadata sit inside a response body
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Dotted path to the records array
    pub records_path: String,
    /// Dotted path to the total page count
    pub total_pages_path: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            records_path: "data".to_string(),
            total_pages_path: "page.totalPages".to_string(),
        }
    }
}

impl DecoderConfig {
    /// Set the records path
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = path.into();
        self
    }

    /// Set the total pages path
    #[must_use]
    pub fn with_total_pages_path(mut self, path: impl Into<String>) -> Self {
        self.total_pages_path = path.into();
        self
    }
}

/// One decoded page of bookings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPage {
    /// Page count reported by the server, if present
    pub total_pages: Option<u32>,
    /// Booking records in arrival order
    pub records: Vec<JsonObject>,
}

impl DecodedPage {
    /// Number of records on the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Trait for decoding response bodies into pages
pub trait PageDecoder: Send + Sync {
    /// Decode a response body
    fn decode(&self, body: &str) -> Result<DecodedPage>;
}
