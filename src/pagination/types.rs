//! Pagination types
//!
//! The bookings endpoint pages by number. The page count is only trusted from
//! the discovery response; every later page is requested blind.

use crate::decode::DecodedPage;
use chrono::Utc;

/// Creation-time window the run asks bookings for, in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// Lower bound (inclusive)
    pub created_from: i64,
    /// Upper bound
    pub created_to: i64,
}

impl FetchWindow {
    /// Create a window
    pub fn new(created_from: i64, created_to: i64) -> Self {
        Self {
            created_from,
            created_to,
        }
    }

    /// Everything created up to now
    pub fn until_now() -> Self {
        Self::new(0, Utc::now().timestamp())
    }
}

/// Query for one bookings page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page number
    pub page: u32,
    /// Records per page
    pub size: u32,
    /// Creation window
    pub window: FetchWindow,
}

impl PageRequest {
    /// Create a request for `page`
    pub fn new(page: u32, size: u32, window: FetchWindow) -> Self {
        Self { page, size, window }
    }

    /// Query parameters in the order the vendor documents them
    pub fn query_params(&self) -> Vec<(String, String)> {
        vec![
            ("createdFrom".to_string(), self.window.created_from.to_string()),
            ("createdTo".to_string(), self.window.created_to.to_string()),
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

/// Result of the discovery request
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Authoritative page count
    pub total_pages: u32,
    /// Page 0, already fetched
    pub first_page: DecodedPage,
}

/// Result of fetching one page
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// HTTP 200 with a decodable body
    Fetched(DecodedPage),
    /// Anything else; the page is skipped
    Failed {
        /// HTTP status, when one was received
        status: Option<u16>,
        /// Human readable cause
        reason: String,
    },
}

impl PageOutcome {
    /// Check if the page was fetched
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }
}

/// Progress through the page range of one run
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Page count from discovery
    pub total_pages: u32,
    /// Next page to request
    pub next_page: u32,
    /// Pages that came back with HTTP 200
    pub pages_fetched: u32,
    /// Pages skipped after a failure
    pub pages_failed: u32,
    /// Records received across fetched pages
    pub records_fetched: u64,
}

impl PaginationState {
    /// Start a run over `total_pages` pages
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            ..Default::default()
        }
    }

    /// Page to request next, or `None` once the range is exhausted
    pub fn advance(&mut self) -> Option<u32> {
        if self.is_done() {
            return None;
        }
        let page = self.next_page;
        self.next_page += 1;
        Some(page)
    }

    /// Record the outcome of a page
    pub fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Fetched(page) => {
                self.pages_fetched += 1;
                self.records_fetched += page.len() as u64;
            }
            PageOutcome::Failed { .. } => self.pages_failed += 1,
        }
    }

    /// Whether every page has been requested
    pub fn is_done(&self) -> bool {
        self.next_page >= self.total_pages
    }
}
