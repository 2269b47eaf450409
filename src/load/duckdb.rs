//! DuckDB loader

use super::{LoadJobConfig, LoadReceipt, WarehouseLoader};
use crate::error::{Error, Result};
use crate::projection::{CellValue, FinalTable, TargetSchema};
use crate::types::ColumnType;
use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::Connection;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads into a DuckDB database file
#[derive(Debug, Clone)]
pub struct DuckDbLoader {
    path: PathBuf,
}

impl DuckDbLoader {
    /// Create a loader for the database at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Database file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WarehouseLoader for DuckDbLoader {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    async fn load(&self, table: &FinalTable, config: &LoadJobConfig) -> Result<LoadReceipt> {
        let path = self.path.clone();
        let table = table.clone();
        let config = config.clone();
        let destination = config.destination.to_string();

        tokio::task::spawn_blocking(move || load_blocking(&path, &table, &config))
            .await
            .map_err(|e| Error::load(destination, format!("load task failed: {e}")))?
    }
}

fn load_blocking(path: &Path, table: &FinalTable, config: &LoadJobConfig) -> Result<LoadReceipt> {
    let mut conn = Connection::open(path)
        .map_err(|e| Error::config(format!("Failed to open DuckDB {}: {e}", path.display())))?;

    let schema_name = quote_ident(&config.destination.dataset);
    let qualified = format!("{schema_name}.{}", quote_ident(&config.destination.table));

    let tx = conn.transaction()?;
    tx.execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {schema_name};"))?;
    tx.execute_batch(&create_table_sql(&qualified, &config.schema))?;

    {
        let mut stmt = tx.prepare(&insert_sql(&qualified, &config.schema))?;
        for row in &table.rows {
            let values = config
                .schema
                .columns()
                .iter()
                .map(|c| {
                    row.get(c.name).map(to_duckdb_value).ok_or_else(|| {
                        Error::load(
                            config.destination.to_string(),
                            format!("no cell for {}", c.name),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            stmt.execute(duckdb::params_from_iter(values))?;
        }
    }

    tx.commit()?;
    debug!("Committed {} rows to {qualified}", table.len());

    Ok(LoadReceipt {
        destination: config.destination.to_string(),
        rows_loaded: table.len(),
        job_id: None,
    })
}

fn create_table_sql(qualified: &str, schema: &TargetSchema) -> String {
    let columns = schema
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(c.name), c.column_type.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE OR REPLACE TABLE {qualified} ({columns});")
}

fn insert_sql(qualified: &str, schema: &TargetSchema) -> String {
    let placeholders = schema
        .columns()
        .iter()
        .map(|c| match c.column_type {
            ColumnType::Date => "CAST(? AS DATE)",
            _ => "?",
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {qualified} VALUES ({placeholders})")
}

fn to_duckdb_value(cell: CellValue<'_>) -> Value {
    match cell {
        CellValue::String(Some(s)) => Value::Text(s.to_string()),
        CellValue::Float64(Some(f)) => Value::Double(f),
        CellValue::Date(Some(d)) => Value::Text(d.format("%Y-%m-%d").to_string()),
        CellValue::String(None) | CellValue::Float64(None) | CellValue::Date(None) => Value::Null,
    }
}

/// Double-quote an identifier for DuckDB SQL
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
