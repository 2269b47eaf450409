//! BigQuery loader
//!
//! Submits a multipart load job (JSON job metadata + Parquet data) and polls
//! the job until BigQuery reports `DONE`.

use super::{LoadJobConfig, LoadReceipt, WarehouseLoader};
use crate::auth::AuthConfig;
use crate::config::{join_url, GcpConfig};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::output::{parquet_bytes, to_record_batch};
use crate::projection::FinalTable;
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const MULTIPART_BOUNDARY: &str = "tripaction_load_boundary";

/// Loads through the BigQuery jobs API
#[derive(Debug)]
pub struct BigQueryLoader {
    client: HttpClient,
    base_url: String,
    project_id: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl BigQueryLoader {
    /// Create a loader billing jobs to `project_id`
    pub fn new(gcp: &GcpConfig, project_id: impl Into<String>, auth: AuthConfig) -> Result<Self> {
        let config = HttpClientConfig::builder()
            .timeout(Duration::from_secs(120))
            .build();
        Ok(Self {
            client: HttpClient::with_auth(config, auth)?,
            base_url: gcp.bigquery_url.clone(),
            project_id: project_id.into(),
            poll_interval: Duration::from_millis(gcp.load_poll_interval_ms),
            timeout: Duration::from_secs(gcp.load_timeout_secs),
        })
    }

    /// Job resource for a load of `config`
    pub fn job_metadata(&self, job_id: &str, config: &LoadJobConfig) -> Value {
        let destination = &config.destination;
        json!({
            "jobReference": {
                "projectId": self.project_id,
                "jobId": job_id,
            },
            "configuration": {
                "load": {
                    "destinationTable": {
                        "projectId": destination.project_or(&self.project_id),
                        "datasetId": destination.dataset,
                        "tableId": destination.table,
                    },
                    "schema": { "fields": config.schema.to_bigquery_fields() },
                    "sourceFormat": "PARQUET",
                    "writeDisposition": config.write_disposition.as_str(),
                    "autodetect": config.autodetect,
                    "allowQuotedNewlines": config.allow_quoted_newlines,
                }
            }
        })
    }

    async fn submit(&self, metadata: &Value, data: Bytes) -> Result<JobResource> {
        let url = join_url(
            &self.base_url,
            &format!(
                "upload/bigquery/v2/projects/{}/jobs?uploadType=multipart",
                self.project_id
            ),
        );
        let body = multipart_related(metadata, &data)?;
        let request = RequestConfig::new().raw(
            format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            body,
        );
        self.client.request_json(Method::POST, &url, request).await
    }

    async fn get_job(&self, job_id: &str, location: Option<&str>) -> Result<JobResource> {
        let url = join_url(
            &self.base_url,
            &format!("bigquery/v2/projects/{}/jobs/{job_id}", self.project_id),
        );
        let mut request = RequestConfig::new();
        if let Some(location) = location {
            request = request.query("location", location);
        }
        self.client.request_json(Method::GET, &url, request).await
    }
}

#[async_trait]
impl WarehouseLoader for BigQueryLoader {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    async fn load(&self, table: &FinalTable, config: &LoadJobConfig) -> Result<LoadReceipt> {
        let destination = config.destination.to_string();
        let batch = to_record_batch(table, &config.schema)?;
        let data = parquet_bytes(&batch, None)?;

        let job_id = format!("tripaction_{}", Utc::now().format("%Y%m%d%H%M%S%f"));
        let metadata = self.job_metadata(&job_id, config);
        debug!("Submitting load job {job_id} ({} bytes)", data.len());

        let mut job = self
            .submit(&metadata, data)
            .await
            .map_err(|e| Error::load(&destination, e.to_string()))?;
        let location = job.job_reference.as_ref().and_then(|r| r.location.clone());
        let started = Instant::now();

        while !job.is_done() {
            if started.elapsed() > self.timeout {
                return Err(Error::load(
                    &destination,
                    format!("job {job_id} not done after {:?}", self.timeout),
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
            job = self
                .get_job(&job_id, location.as_deref())
                .await
                .map_err(|e| Error::load(&destination, e.to_string()))?;
        }

        if let Some(error) = job.status.as_ref().and_then(|s| s.error_result.as_ref()) {
            return Err(Error::load(&destination, error.to_string()));
        }

        let rows_loaded = job.output_rows().unwrap_or(table.len());
        info!("Load job {job_id} done");
        Ok(LoadReceipt {
            destination,
            rows_loaded,
            job_id: Some(job_id),
        })
    }
}

// ============================================================================
// Job resource
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResource {
    #[serde(default)]
    job_reference: Option<JobReference>,
    #[serde(default)]
    status: Option<JobStatus>,
    #[serde(default)]
    statistics: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct JobReference {
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error_result: Option<JobError>,
}

#[derive(Debug, Deserialize)]
struct JobError {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.reason.as_deref().unwrap_or("error"),
            self.message.as_deref().unwrap_or("load job failed")
        )
    }
}

impl JobResource {
    fn is_done(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.state.as_deref())
            .is_some_and(|state| state == "DONE")
    }

    fn output_rows(&self) -> Option<usize> {
        let rows = self.statistics.as_ref()?.get("load")?.get("outputRows")?;
        match rows {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            _ => None,
        }
    }
}

/// Build a `multipart/related` body: JSON metadata part, then the data part
fn multipart_related(metadata: &Value, data: &[u8]) -> Result<Bytes> {
    let metadata = serde_json::to_vec(metadata)?;
    let mut body = BytesMut::with_capacity(metadata.len() + data.len() + 256);

    body.put_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.put_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.put_slice(&metadata);
    body.put_slice(format!("\r\n--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.put_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.put_slice(data);
    body.put_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Ok(body.freeze())
}
