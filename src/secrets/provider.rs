//! Secret provider implementations

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// Credential
// ============================================================================

/// A secret value fetched for one run
///
/// The value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the secret value
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Take the secret value
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Looks up credentials by name and version
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch one secret version
    async fn access_secret(&self, name: &str, version: &str) -> Result<Credential>;
}

// ============================================================================
// GCP Secret Manager
// ============================================================================

/// Reads secrets through the Secret Manager REST API
#[derive(Debug)]
pub struct SecretManagerProvider {
    client: HttpClient,
    base_url: String,
    project_id: String,
}

impl SecretManagerProvider {
    /// Create a provider for `project_id`, authenticating with `auth`
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        auth: AuthConfig,
    ) -> Result<Self> {
        let config = HttpClientConfig::builder()
            .timeout(Duration::from_secs(30))
            .build();
        Ok(Self {
            client: HttpClient::with_auth(config, auth)?,
            base_url: base_url.into(),
            project_id: project_id.into(),
        })
    }

    /// Resource name of a secret version
    pub fn version_path(&self, name: &str, version: &str) -> String {
        format!(
            "projects/{}/secrets/{}/versions/{}",
            self.project_id, name, version
        )
    }
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: Option<SecretPayload>,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    data: Option<String>,
}

#[async_trait]
impl SecretProvider for SecretManagerProvider {
    async fn access_secret(&self, name: &str, version: &str) -> Result<Credential> {
        let resource = self.version_path(name, version);
        let url = crate::config::join_url(&self.base_url, &format!("v1/{resource}:access"));
        debug!("Accessing secret {resource}");

        let response: AccessSecretVersionResponse = self
            .client
            .request_json(reqwest::Method::GET, &url, RequestConfig::new())
            .await
            .map_err(|e| Error::secret(name, e.to_string()))?;

        let data = response
            .payload
            .and_then(|p| p.data)
            .ok_or_else(|| Error::secret(name, "response has no payload data"))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| Error::secret(name, format!("payload is not base64: {e}")))?;
        let value = String::from_utf8(bytes)
            .map_err(|_| Error::secret(name, "payload is not valid UTF-8"))?;

        Ok(Credential::new(value))
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Reads secrets from environment variables
///
/// `tripaction_client_id` is looked up as `TRIPACTION_CLIENT_ID`. The version
/// is ignored.
#[derive(Debug, Default)]
pub struct EnvSecretProvider {
    prefix: Option<String>,
}

impl EnvSecretProvider {
    /// Create a provider without a variable prefix
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` to every variable name
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Variable name a secret is read from
    pub fn variable_name(&self, name: &str) -> String {
        let base: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        match &self.prefix {
            Some(prefix) => format!("{prefix}{base}"),
            None => base,
        }
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn access_secret(&self, name: &str, _version: &str) -> Result<Credential> {
        let var = self.variable_name(name);
        match std::env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(Credential::new(value)),
            _ => Err(Error::secret(name, format!("environment variable {var} is not set"))),
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Fixed secrets, keyed by name
#[derive(Debug, Default, Clone)]
pub struct InMemorySecretProvider {
    secrets: HashMap<String, Credential>,
}

impl InMemorySecretProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), Credential::new(value));
        self
    }
}

#[async_trait]
impl SecretProvider for InMemorySecretProvider {
    async fn access_secret(&self, name: &str, _version: &str) -> Result<Credential> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::secret(name, "no such secret"))
    }
}
