//! Output module
//!
//! Turns the final table into Arrow and Parquet for the loaders:
//! - Final table to Arrow RecordBatch (`Utf8`, `Float64`, `Date32`)
//! - Parquet encoding to a buffer or a file
//! - Object storage output (S3, GCS, Azure, local)

mod cloud;
mod schema;
mod writer;

pub use cloud::{table_object_path, CloudDestination};
pub use schema::{arrow_schema, arrow_type, date_to_days, to_record_batch};
pub use writer::{parquet_bytes, ParquetWriterConfig};
