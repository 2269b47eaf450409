//! HTTP client module
//!
//! Provides the HTTP client used for the vendor API and Google APIs.
//!
//! # Features
//!
//! - **Timeouts**: Per-client default with per-request override
//! - **Optional Retries**: Bounded retry with backoff, off by default
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Integration with auth module

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestBody, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
