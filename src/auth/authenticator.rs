//! Authenticator implementation
//!
//! Handles applying authentication to requests and managing token refresh
//! for the Google APIs (Secret Manager, BigQuery).

use super::types::{AuthConfig, CachedToken, ServiceAccountKey, TokenResponse};
use crate::config::GcpConfig;
use crate::error::{Error, Result};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Scope covering Secret Manager and BigQuery
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Default metadata server token URL
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const SERVICE_ACCOUNT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for service account / metadata auth
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),
            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),
            AuthConfig::GoogleServiceAccount { .. } | AuthConfig::GoogleMetadata { .. } => {
                let token = self.get_or_refresh_token().await?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    /// Get a valid token, refreshing if necessary
    async fn get_or_refresh_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_new_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch a new token based on auth type
    async fn fetch_new_token(&self) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::GoogleServiceAccount {
                client_email,
                private_key,
                token_url,
                scopes,
            } => {
                self.exchange_service_account_jwt(client_email, private_key, token_url, scopes)
                    .await
            }
            AuthConfig::GoogleMetadata { url } => self.fetch_metadata_token(url).await,
            _ => Err(Error::auth(
                "Token refresh not supported for this auth type",
            )),
        }
    }

    /// Sign a JWT with the service account key and exchange it for an access token
    async fn exchange_service_account_jwt(
        &self,
        client_email: &str,
        private_key: &str,
        token_url: &str,
        scopes: &[String],
    ) -> Result<CachedToken> {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            iss: client_email.to_string(),
            scope: scopes.join(" "),
            aud: token_url.to_string(),
            iat: now,
            exp: now + SERVICE_ACCOUNT_TOKEN_LIFETIME_SECS,
        };

        let encoding_key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| {
            Error::JwtGeneration {
                message: format!("Invalid private key: {e}"),
            }
        })?;

        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key).map_err(|e| {
            Error::JwtGeneration {
                message: format!("Failed to encode JWT: {e}"),
            }
        })?;

        let form = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ];

        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::JwtGeneration {
                message: format!("JWT token exchange failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        into_cached_token(token_response)
    }

    /// Ask the metadata server for the default service account token
    async fn fetch_metadata_token(&self, url: &str) -> Result<CachedToken> {
        let response = self
            .http_client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(Error::auth(format!(
                "Metadata server token request failed with status {status}"
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        into_cached_token(token_response)
    }

    /// Clear the cached token
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

fn into_cached_token(response: TokenResponse) -> Result<CachedToken> {
    let token = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::auth("token response has no access_token"))?;
    Ok(match response.expires_in {
        Some(secs) => CachedToken::expires_in(token, secs),
        None => CachedToken::new(token, None),
    })
}

/// JWT claims for the Google JWT bearer grant
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Pick Google credentials from the environment
///
/// Order: `GOOGLE_OAUTH_ACCESS_TOKEN`, then the key file named by
/// `GOOGLE_APPLICATION_CREDENTIALS`, then the metadata server.
pub fn google_auth_from_env(gcp: &GcpConfig) -> Result<AuthConfig> {
    google_auth_from_lookup(gcp, |key| std::env::var(key).ok())
}

/// Same as [`google_auth_from_env`] with an injectable variable lookup
pub fn google_auth_from_lookup<F>(gcp: &GcpConfig, lookup: F) -> Result<AuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup("GOOGLE_OAUTH_ACCESS_TOKEN").filter(|t| !t.is_empty()) {
        debug!("Using Google access token from environment");
        return Ok(AuthConfig::Bearer { token });
    }

    if let Some(path) = lookup("GOOGLE_APPLICATION_CREDENTIALS").filter(|p| !p.is_empty()) {
        debug!("Using service account key file {path}");
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::auth(format!("Failed to read service account key {path}: {e}"))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&content)?;
        return Ok(AuthConfig::GoogleServiceAccount {
            client_email: key.client_email,
            private_key: key.private_key,
            token_url: key.token_uri.unwrap_or_else(|| gcp.token_url.clone()),
            scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
        });
    }

    debug!("Using metadata server credentials");
    Ok(AuthConfig::GoogleMetadata {
        url: METADATA_TOKEN_URL.to_string(),
    })
}
