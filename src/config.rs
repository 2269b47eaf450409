//! Job configuration
//!
//! Every knob of a run lives in [`EtlConfig`]. The file format is YAML and
//! every field has a default, so an empty file (or no file at all) yields the
//! production setup for the TripActions bookings feed.

use crate::error::{Error, Result, ResultExt};
use crate::types::{MissingStartDate, SecretProviderKind, SinkKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete job configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtlConfig {
    /// GCP project used for secrets and the warehouse client
    #[serde(default)]
    pub project_id: Option<String>,

    /// Vendor API settings
    #[serde(default)]
    pub vendor: VendorConfig,

    /// Named credentials
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Load destination
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Row normalization settings
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Google API endpoints
    #[serde(default)]
    pub gcp: GcpConfig,
}

impl EtlConfig {
    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a config from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// The project id, or a config error when none was given
    pub fn require_project_id(&self) -> Result<&str> {
        self.project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::invalid_value("project_id", "a GCP project id is required"))
    }

    /// Check values that would otherwise fail halfway through a run
    pub fn validate(&self) -> Result<()> {
        if self.vendor.page_size == 0 || self.vendor.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "vendor.page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        url::Url::parse(&self.vendor.base_url)?;

        if self.secrets.client_id.trim().is_empty() {
            return Err(Error::invalid_value("secrets.client_id", "must not be empty"));
        }
        if self.secrets.client_secret.trim().is_empty() {
            return Err(Error::invalid_value(
                "secrets.client_secret",
                "must not be empty",
            ));
        }

        crate::load::TableRef::parse(&self.destination.table)?;
        Ok(())
    }
}

/// Largest page the bookings endpoint serves
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// Vendor
// ============================================================================

/// Vendor API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// API root, without trailing path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth token endpoint path
    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Bookings listing path
    #[serde(default = "default_bookings_path")]
    pub bookings_path: String,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Timeout for the token request
    #[serde(default = "default_token_timeout")]
    pub token_timeout_secs: u64,

    /// Timeout for each bookings request
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Retries per bookings request (0 = single attempt)
    #[serde(default)]
    pub max_retries: u32,

    /// Initial retry backoff
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Optional client-side rate limit
    #[serde(default)]
    pub requests_per_second: Option<u32>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_path: default_token_path(),
            bookings_path: default_bookings_path(),
            page_size: default_page_size(),
            token_timeout_secs: default_token_timeout(),
            page_timeout_secs: default_page_timeout(),
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff_ms(),
            requests_per_second: None,
        }
    }
}

impl VendorConfig {
    /// Full token endpoint URL
    pub fn token_url(&self) -> String {
        join_url(&self.base_url, &self.token_path)
    }

    /// Full bookings endpoint URL
    pub fn bookings_url(&self) -> String {
        join_url(&self.base_url, &self.bookings_path)
    }

    /// Token request timeout
    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_secs)
    }

    /// Bookings request timeout
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://api.tripactions.com".to_string()
}

fn default_token_path() -> String {
    "/ta-auth/oauth/token".to_string()
}

fn default_bookings_path() -> String {
    "/v1/bookings".to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_token_timeout() -> u64 {
    10
}

fn default_page_timeout() -> u64 {
    15
}

fn default_initial_backoff_ms() -> u64 {
    500
}

// ============================================================================
// Secrets
// ============================================================================

/// Named credentials for the vendor client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Where secrets are resolved from
    #[serde(default)]
    pub provider: SecretProviderKind,

    /// Secret holding the OAuth client id
    #[serde(default = "default_client_id_secret")]
    pub client_id: String,

    /// Secret holding the OAuth client secret
    #[serde(default = "default_client_secret_secret")]
    pub client_secret: String,

    /// Secret version
    #[serde(default = "default_secret_version")]
    pub version: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            provider: SecretProviderKind::default(),
            client_id: default_client_id_secret(),
            client_secret: default_client_secret_secret(),
            version: default_secret_version(),
        }
    }
}

fn default_client_id_secret() -> String {
    "tripaction_client_id".to_string()
}

fn default_client_secret_secret() -> String {
    "tripaction_client_secret".to_string()
}

fn default_secret_version() -> String {
    "latest".to_string()
}

// ============================================================================
// Destination
// ============================================================================

/// Load destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// `dataset.table` or `project.dataset.table`
    #[serde(default = "default_table")]
    pub table: String,

    /// Which loader commits the table
    #[serde(default)]
    pub sink: SinkKind,

    /// DuckDB file for the `duckdb` sink
    #[serde(default = "default_duckdb_path")]
    pub duckdb_path: String,

    /// Base URL (local path, s3://, gs://, ...) for the `parquet` sink
    #[serde(default = "default_output_url")]
    pub output_url: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            sink: SinkKind::default(),
            duckdb_path: default_duckdb_path(),
            output_url: default_output_url(),
        }
    }
}

fn default_table() -> String {
    "data_engineering.tripaction".to_string()
}

fn default_duckdb_path() -> String {
    "tripaction.duckdb".to_string()
}

fn default_output_url() -> String {
    "./warehouse".to_string()
}

// ============================================================================
// Normalize
// ============================================================================

/// Row normalization settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Policy for records without a usable start date
    #[serde(default)]
    pub missing_start_date: MissingStartDate,
}

// ============================================================================
// GCP
// ============================================================================

/// Google API endpoints and load-job polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    /// Secret Manager API root
    #[serde(default = "default_secret_manager_url")]
    pub secret_manager_url: String,

    /// BigQuery API root
    #[serde(default = "default_bigquery_url")]
    pub bigquery_url: String,

    /// OAuth token endpoint for service-account JWT exchange
    #[serde(default = "default_google_token_url")]
    pub token_url: String,

    /// Delay between load job status polls
    #[serde(default = "default_poll_interval_ms")]
    pub load_poll_interval_ms: u64,

    /// Give up waiting for a load job after this long
    #[serde(default = "default_load_timeout")]
    pub load_timeout_secs: u64,
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            secret_manager_url: default_secret_manager_url(),
            bigquery_url: default_bigquery_url(),
            token_url: default_google_token_url(),
            load_poll_interval_ms: default_poll_interval_ms(),
            load_timeout_secs: default_load_timeout(),
        }
    }
}

fn default_secret_manager_url() -> String {
    "https://secretmanager.googleapis.com".to_string()
}

fn default_bigquery_url() -> String {
    "https://bigquery.googleapis.com".to_string()
}

fn default_google_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_load_timeout() -> u64 {
    600
}

/// Join a base URL and a path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
