//! Parquet snapshot loader for object storage

use super::{LoadJobConfig, LoadReceipt, WarehouseLoader};
use crate::error::Result;
use crate::output::{parquet_bytes, to_record_batch, CloudDestination};
use crate::projection::FinalTable;
use async_trait::async_trait;

/// Overwrites `{dataset}/{table}/data.parquet` under a bucket or directory
#[derive(Debug, Clone)]
pub struct ParquetObjectLoader {
    destination: CloudDestination,
}

impl ParquetObjectLoader {
    /// Create a loader writing under `url` (`s3://`, `gs://`, `az://` or a local path)
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            destination: CloudDestination::parse(url)?,
        })
    }

    /// Create a loader over an existing destination
    pub fn with_destination(destination: CloudDestination) -> Self {
        Self { destination }
    }
}

#[async_trait]
impl WarehouseLoader for ParquetObjectLoader {
    fn name(&self) -> &'static str {
        "parquet"
    }

    async fn load(&self, table: &FinalTable, config: &LoadJobConfig) -> Result<LoadReceipt> {
        let batch = to_record_batch(table, &config.schema)?;
        let data = parquet_bytes(&batch, None)?;
        let location = self
            .destination
            .write_table_parquet(&config.destination.dataset, &config.destination.table, data)
            .await?;

        Ok(LoadReceipt {
            destination: location,
            rows_loaded: table.len(),
            job_id: None,
        })
    }
}
