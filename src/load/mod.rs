//! Warehouse loading
//!
//! A [`WarehouseLoader`] commits the final table to its destination and
//! returns only once the data is durable. Every loader replaces the
//! destination wholesale by default.
//!
//! - [`BigQueryLoader`]: multipart load job, polled until `DONE`
//! - [`DuckDbLoader`]: `CREATE OR REPLACE TABLE` in one transaction
//! - [`ParquetObjectLoader`]: overwrites `{dataset}/{table}/data.parquet`

mod bigquery;
mod duckdb;
mod object_store;

pub use self::bigquery::BigQueryLoader;
pub use self::duckdb::DuckDbLoader;
pub use self::object_store::ParquetObjectLoader;

use crate::error::{Error, Result};
use crate::projection::{FinalTable, TargetSchema};
use crate::types::WriteDisposition;
use async_trait::async_trait;
use std::fmt;

// ============================================================================
// Table Reference
// ============================================================================

/// `dataset.table` or `project.dataset.table`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Owning project, when given explicitly
    pub project: Option<String>,
    /// Dataset (schema) name
    pub dataset: String,
    /// Table name
    pub table: String,
}

impl TableRef {
    /// Parse a dotted table name
    pub fn parse(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.trim().split('.').collect();
        let (project, dataset, table) = match parts.as_slice() {
            [dataset, table] => (None, *dataset, *table),
            [project, dataset, table] => (Some(*project), *dataset, *table),
            _ => {
                return Err(Error::invalid_value(
                    "destination.table",
                    format!("'{name}' is not dataset.table or project.dataset.table"),
                ))
            }
        };

        if let Some(project) = project {
            if project.is_empty()
                || !project
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
            {
                return Err(Error::invalid_value(
                    "destination.table",
                    format!("invalid project id '{project}'"),
                ));
            }
        }
        for (what, ident) in [("dataset", dataset), ("table", table)] {
            if ident.is_empty() || !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(Error::invalid_value(
                    "destination.table",
                    format!("invalid {what} name '{ident}'"),
                ));
            }
        }

        Ok(Self {
            project: project.map(str::to_string),
            dataset: dataset.to_string(),
            table: table.to_string(),
        })
    }

    /// Project to load into, falling back to `default_project`
    pub fn project_or<'a>(&'a self, default_project: &'a str) -> &'a str {
        self.project.as_deref().unwrap_or(default_project)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project {
            Some(project) => write!(f, "{project}.{}.{}", self.dataset, self.table),
            None => write!(f, "{}.{}", self.dataset, self.table),
        }
    }
}

// ============================================================================
// Load Job
// ============================================================================

/// How the final table is committed
#[derive(Debug, Clone)]
pub struct LoadJobConfig {
    /// Destination table
    pub destination: TableRef,
    /// Explicit column layout
    pub schema: TargetSchema,
    /// Always `WRITE_TRUNCATE`
    pub write_disposition: WriteDisposition,
    /// Let the warehouse infer the schema
    pub autodetect: bool,
    /// Accept newlines inside quoted values
    pub allow_quoted_newlines: bool,
}

impl LoadJobConfig {
    /// Full replace of `destination` with the bookings schema
    pub fn full_replace(destination: TableRef) -> Self {
        Self {
            destination,
            schema: TargetSchema::bookings(),
            write_disposition: WriteDisposition::WriteTruncate,
            autodetect: false,
            allow_quoted_newlines: true,
        }
    }
}

/// Proof that a load completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReceipt {
    /// Fully qualified destination
    pub destination: String,
    /// Rows now in the destination from this load
    pub rows_loaded: usize,
    /// Warehouse job id, when the warehouse has jobs
    pub job_id: Option<String>,
}

/// Commits a final table to a warehouse
#[async_trait]
pub trait WarehouseLoader: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Load `table` and wait until the load is durable
    async fn load(&self, table: &FinalTable, config: &LoadJobConfig) -> Result<LoadReceipt>;
}
