//! Tests for the auth module

use super::*;
use crate::config::{GcpConfig, VendorConfig};
use crate::error::Error;
use std::collections::HashMap;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/test_service_account.pem");

fn vendor_for(server: &MockServer) -> VendorConfig {
    VendorConfig {
        base_url: server.uri(),
        ..VendorConfig::default()
    }
}

// ============================================================================
// TokenMinter
// ============================================================================

#[tokio::test]
async fn test_mint_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ta-auth/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=my-id"))
        .and(body_string_contains("client_secret=my-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "session-abc",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let minter = TokenMinter::new(&vendor_for(&server)).unwrap();
    let token = minter
        .mint(&ClientCredentials::new("my-id", "my-secret"))
        .await
        .unwrap();

    assert_eq!(token.access_token(), "session-abc");
    assert_eq!(token.authorization(), "Bearer session-abc");
}

#[tokio::test]
async fn test_mint_without_expiry_uses_default_lifetime() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ta-auth/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "t"})),
        )
        .mount(&server)
        .await;

    let minter = TokenMinter::new(&vendor_for(&server)).unwrap();
    let token = minter
        .mint(&ClientCredentials::new("id", "secret"))
        .await
        .unwrap();

    let remaining = token.expires_at() - chrono::Utc::now();
    assert!(remaining > chrono::Duration::hours(11));
}

#[tokio::test]
async fn test_mint_unauthorized_is_token_mint_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ta-auth/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
        .expect(1)
        .mount(&server)
        .await;

    let minter = TokenMinter::new(&vendor_for(&server)).unwrap();
    let err = minter
        .mint(&ClientCredentials::new("id", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TokenMint { status: 401 }));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_mint_non_200_success_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ta-auth/oauth/token"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"access_token": "t"})),
        )
        .mount(&server)
        .await;

    let minter = TokenMinter::new(&vendor_for(&server)).unwrap();
    let err = minter
        .mint(&ClientCredentials::new("id", "secret"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TokenMint { status: 201 }));
}

#[tokio::test]
async fn test_mint_missing_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ta-auth/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token_type": "Bearer"})),
        )
        .mount(&server)
        .await;

    let minter = TokenMinter::new(&vendor_for(&server)).unwrap();
    let err = minter
        .mint(&ClientCredentials::new("id", "secret"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
}

// ============================================================================
// Authenticator
// ============================================================================

#[tokio::test]
async fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let req = reqwest::Client::new().get("https://example.com/api");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert!(built.headers().get("Authorization").is_none());
}

#[tokio::test]
async fn test_bearer_auth() {
    let auth = Authenticator::new(AuthConfig::Bearer {
        token: "my-bearer-token".to_string(),
    });
    let req = reqwest::Client::new().get("https://example.com/api");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer my-bearer-token"
    );
}

#[tokio::test]
async fn test_session_token_auth_config() {
    let token = SessionToken::new("vendor-token", 60);
    let auth = Authenticator::new(token.auth_config());
    let req = reqwest::Client::new().get("https://example.com/api");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer vendor-token"
    );
}

#[tokio::test]
async fn test_service_account_exchange_and_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.google",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Authenticator::new(AuthConfig::GoogleServiceAccount {
        client_email: "etl@project.iam.gserviceaccount.com".to_string(),
        private_key: TEST_PRIVATE_KEY.to_string(),
        token_url: format!("{}/token", server.uri()),
        scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
    });

    let client = reqwest::Client::new();
    for _ in 0..2 {
        let req = client.get("https://bigquery.example.com/jobs");
        let built = auth.apply(req).await.unwrap().build().unwrap();
        assert_eq!(
            built.headers().get("Authorization").unwrap(),
            "Bearer ya29.google"
        );
    }
}

#[tokio::test]
async fn test_service_account_bad_key() {
    let auth = Authenticator::new(AuthConfig::GoogleServiceAccount {
        client_email: "etl@project.iam.gserviceaccount.com".to_string(),
        private_key: "not a key".to_string(),
        token_url: "http://127.0.0.1:1/token".to_string(),
        scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
    });

    let req = reqwest::Client::new().get("https://example.com");
    let err = auth.apply(req).await.unwrap_err();
    assert!(matches!(err, Error::JwtGeneration { .. }));
}

#[tokio::test]
async fn test_metadata_server_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/computeMetadata/v1/instance/service-accounts/default/token"))
        .and(header("Metadata-Flavor", "Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.metadata",
            "expires_in": 1800
        })))
        .mount(&server)
        .await;

    let auth = Authenticator::new(AuthConfig::GoogleMetadata {
        url: format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            server.uri()
        ),
    });

    let req = reqwest::Client::new().get("https://example.com");
    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer ya29.metadata"
    );
}

#[tokio::test]
async fn test_metadata_server_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let auth = Authenticator::new(AuthConfig::GoogleMetadata {
        url: format!("{}/token", server.uri()),
    });

    let req = reqwest::Client::new().get("https://example.com");
    assert!(auth.apply(req).await.is_err());
}

#[tokio::test]
async fn test_clear_cache_forces_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh",
            "expires_in": 3600
        })))
        .expect(2)
        .mount(&server)
        .await;

    let auth = Authenticator::new(AuthConfig::GoogleMetadata {
        url: format!("{}/token", server.uri()),
    });
    let client = reqwest::Client::new();

    auth.apply(client.get("https://example.com")).await.unwrap();
    auth.clear_cache().await;
    auth.apply(client.get("https://example.com")).await.unwrap();
}

// ============================================================================
// Google credential discovery
// ============================================================================

#[test]
fn test_google_auth_prefers_access_token() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("GOOGLE_OAUTH_ACCESS_TOKEN", "ya29.env"),
        ("GOOGLE_APPLICATION_CREDENTIALS", "/does/not/exist.json"),
    ]);
    let auth = google_auth_from_lookup(&GcpConfig::default(), |k| {
        env.get(k).map(|v| (*v).to_string())
    })
    .unwrap();

    assert!(matches!(auth, AuthConfig::Bearer { token } if token == "ya29.env"));
}

#[test]
fn test_google_auth_from_key_file() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("sa.json");
    std::fs::write(
        &key_path,
        serde_json::json!({
            "type": "service_account",
            "client_email": "etl@project.iam.gserviceaccount.com",
            "private_key": TEST_PRIVATE_KEY,
        })
        .to_string(),
    )
    .unwrap();

    let key_path = key_path.to_string_lossy().to_string();
    let auth = google_auth_from_lookup(&GcpConfig::default(), |k| {
        (k == "GOOGLE_APPLICATION_CREDENTIALS").then(|| key_path.clone())
    })
    .unwrap();

    match auth {
        AuthConfig::GoogleServiceAccount {
            client_email,
            token_url,
            scopes,
            ..
        } => {
            assert_eq!(client_email, "etl@project.iam.gserviceaccount.com");
            assert_eq!(token_url, GcpConfig::default().token_url);
            assert_eq!(scopes, vec![CLOUD_PLATFORM_SCOPE.to_string()]);
        }
        other => panic!("expected service account auth, got {other:?}"),
    }
}

#[test]
fn test_google_auth_missing_key_file() {
    let result = google_auth_from_lookup(&GcpConfig::default(), |k| {
        (k == "GOOGLE_APPLICATION_CREDENTIALS").then(|| "/no/such/key.json".to_string())
    });
    assert!(result.is_err());
}

#[test]
fn test_google_auth_falls_back_to_metadata() {
    let auth = google_auth_from_lookup(&GcpConfig::default(), |_| None).unwrap();
    assert!(matches!(auth, AuthConfig::GoogleMetadata { url } if url == METADATA_TOKEN_URL));
}
