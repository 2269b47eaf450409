//! Pagination module
//!
//! # Overview
//!
//! A run makes one discovery request for page 0 to learn `totalPages`, then
//! walks pages `0..totalPages` strictly in order. A page that fails is
//! skipped with a warning; a failed discovery stops the run.

mod fetcher;
mod types;

pub use fetcher::BookingsFetcher;
pub use types::{Discovery, FetchWindow, PageOutcome, PageRequest, PaginationState};
