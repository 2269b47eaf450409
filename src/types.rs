//! Common types used throughout the bookings ETL
//!
//! This module contains shared type definitions, type aliases,
//! and small enums used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Warehouse Column Types
// ============================================================================

/// Column type in the warehouse target schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    /// UTF-8 text
    String,
    /// 64-bit float
    Float64,
    /// Calendar date without time
    Date,
}

impl ColumnType {
    /// BigQuery type name
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "STRING",
            ColumnType::Float64 => "FLOAT64",
            ColumnType::Date => "DATE",
        }
    }

    /// DuckDB SQL type name
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::String => "VARCHAR",
            ColumnType::Float64 => "DOUBLE",
            ColumnType::Date => "DATE",
        }
    }
}

/// Column mode in the warehouse target schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnMode {
    /// Column may hold NULL
    #[default]
    Nullable,
    /// Column must be present
    Required,
}

impl ColumnMode {
    /// BigQuery mode name
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnMode::Nullable => "NULLABLE",
            ColumnMode::Required => "REQUIRED",
        }
    }
}

// ============================================================================
// Write Disposition
// ============================================================================

/// How a load job treats existing rows in the destination
///
/// Every load is a full replace, so truncation is the only variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    /// Truncate the destination, then insert
    #[default]
    WriteTruncate,
}

impl WriteDisposition {
    /// BigQuery API name
    pub fn as_str(self) -> &'static str {
        match self {
            WriteDisposition::WriteTruncate => "WRITE_TRUNCATE",
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Run-level switches
// ============================================================================

/// Where the final table is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// BigQuery load job
    #[default]
    Bigquery,
    /// Local DuckDB database file
    Duckdb,
    /// Parquet object in a local or cloud bucket
    Parquet,
}

/// Where named credentials are resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretProviderKind {
    /// GCP Secret Manager
    #[default]
    SecretManager,
    /// Process environment
    Env,
}

/// What to do with records that lack a usable `startDate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStartDate {
    /// Drop every record of the page
    #[default]
    DropPage,
    /// Drop only the offending record
    DropRow,
}
