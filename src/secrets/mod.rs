//! Credential retrieval
//!
//! The vendor client id and secret live in a secret store. They are fetched
//! fresh every run and handed to the token minter.

mod provider;

pub use provider::{
    Credential, EnvSecretProvider, InMemorySecretProvider, SecretManagerProvider, SecretProvider,
};

use crate::auth::ClientCredentials;
use crate::config::SecretsConfig;
use crate::error::Result;
use tracing::debug;

/// Fetch the vendor client credentials named in `config`
pub async fn resolve_client_credentials(
    provider: &dyn SecretProvider,
    config: &SecretsConfig,
) -> Result<ClientCredentials> {
    debug!(
        "Resolving client credentials ({}, {}) version {}",
        config.client_id, config.client_secret, config.version
    );
    let client_id = provider
        .access_secret(&config.client_id, &config.version)
        .await?;
    let client_secret = provider
        .access_secret(&config.client_secret, &config.version)
        .await?;
    Ok(ClientCredentials::new(
        client_id.into_inner(),
        client_secret.into_inner(),
    ))
}
