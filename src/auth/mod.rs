//! Authentication module
//!
//! Two concerns live here:
//!
//! - `TokenMinter` exchanges the vendor client credentials for the run's
//!   bearer `SessionToken`.
//! - `Authenticator` applies auth to requests and caches refreshed tokens
//!   for the Google APIs (service account JWT or metadata server).

mod authenticator;
mod minter;
mod types;

pub use authenticator::{
    google_auth_from_env, google_auth_from_lookup, Authenticator, CLOUD_PLATFORM_SCOPE,
    METADATA_TOKEN_URL,
};
pub use minter::TokenMinter;
pub use types::{
    AuthConfig, CachedToken, ClientCredentials, ServiceAccountKey, SessionToken,
    DEFAULT_SESSION_LIFETIME_SECS,
};

#[cfg(test)]
mod tests;
