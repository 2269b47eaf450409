//! Bookings page fetcher

use super::types::{Discovery, FetchWindow, PageOutcome, PageRequest};
use crate::auth::SessionToken;
use crate::config::VendorConfig;
use crate::decode::{BookingsDecoder, DecodedPage, PageDecoder};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, RequestConfig};
use crate::types::BackoffType;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches bookings pages with the run's session token
#[derive(Debug)]
pub struct BookingsFetcher {
    client: HttpClient,
    url: String,
    page_size: u32,
    window: FetchWindow,
    decoder: BookingsDecoder,
}

impl BookingsFetcher {
    /// Create a fetcher for the configured vendor
    pub fn new(vendor: &VendorConfig, token: &SessionToken, window: FetchWindow) -> Result<Self> {
        let mut builder = HttpClientConfig::builder()
            .timeout(vendor.page_timeout())
            .max_retries(vendor.max_retries)
            .backoff(
                BackoffType::Exponential,
                Duration::from_millis(vendor.initial_backoff_ms),
                Duration::from_secs(30),
            );
        if let Some(rps) = vendor.requests_per_second {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }

        Ok(Self {
            client: HttpClient::with_auth(builder.build(), token.auth_config())?,
            url: vendor.bookings_url(),
            page_size: vendor.page_size,
            window,
            decoder: BookingsDecoder::new(),
        })
    }

    /// The creation window every request carries
    pub fn window(&self) -> FetchWindow {
        self.window
    }

    /// Request page 0 and read the authoritative page count
    ///
    /// Anything but HTTP 200 fails the run.
    pub async fn discover(&self) -> Result<Discovery> {
        let first_page = match self.get_page(0).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Unable to discover pages: {e}");
                return Err(match e.status() {
                    Some(status) => Error::Discovery { status },
                    None => e,
                });
            }
        };

        let total_pages = first_page
            .total_pages
            .ok_or_else(|| Error::decode("discovery response has no page.totalPages"))?;
        debug!("Discovered {total_pages} pages");

        Ok(Discovery {
            total_pages,
            first_page,
        })
    }

    /// Fetch one page; failures are logged and reported, never raised
    pub async fn fetch_page(&self, page: u32) -> PageOutcome {
        match self.get_page(page).await {
            Ok(decoded) => PageOutcome::Fetched(decoded),
            Err(e) => {
                let status = e.status();
                match status {
                    Some(code) => warn!("Failed to fetch page {page} with status code {code}"),
                    None => warn!("Failed to fetch page {page}: {e}"),
                }
                PageOutcome::Failed {
                    status,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn get_page(&self, page: u32) -> Result<DecodedPage> {
        let request = PageRequest::new(page, self.page_size, self.window);
        let config = request
            .query_params()
            .into_iter()
            .fold(RequestConfig::new(), |config, (key, value)| {
                config.query(key, value)
            });

        let response = self.client.get_with_config(&self.url, config).await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.text().await.map_err(Error::Http)?;
        let decoded = self.decoder.decode(&body)?;
        debug!("Fetched page {page} with {} records", decoded.len());
        Ok(decoded)
    }
}
