//! Vendor session token minting
//!
//! One OAuth client-credentials request per run. Anything but HTTP 200 means
//! there is no token and the run must stop.

use super::types::{
    ClientCredentials, SessionToken, TokenResponse, DEFAULT_SESSION_LIFETIME_SECS,
};
use crate::config::VendorConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use reqwest::StatusCode;
use tracing::{info, warn};

/// Exchanges client credentials for a vendor bearer token
#[derive(Debug)]
pub struct TokenMinter {
    client: HttpClient,
    token_url: String,
}

impl TokenMinter {
    /// Create a minter for the configured vendor
    pub fn new(vendor: &VendorConfig) -> Result<Self> {
        let config = HttpClientConfig::builder()
            .timeout(vendor.token_timeout())
            .max_retries(0)
            .build();
        Ok(Self {
            client: HttpClient::with_config(config)?,
            token_url: vendor.token_url(),
        })
    }

    /// Mint a session token with a single attempt
    pub async fn mint(&self, credentials: &ClientCredentials) -> Result<SessionToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let response = match self
            .client
            .post_with_config(&self.token_url, RequestConfig::new().form(form))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                if let Some(status) = e.status() {
                    warn!("Error while fetching token: {status}");
                    return Err(Error::TokenMint { status });
                }
                warn!("Error while fetching token: {e}");
                return Err(e);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Error while fetching token: {}", status.as_u16());
            return Err(Error::TokenMint {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response.json().await.map_err(Error::Http)?;
        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::auth("token response has no access_token"))?;

        info!("Received token for tripaction");
        Ok(SessionToken::new(
            access_token,
            body.expires_in.unwrap_or(DEFAULT_SESSION_LIFETIME_SECS),
        ))
    }
}
