//! Final table to Arrow conversion
//!
//! Builds one column array per target column, in schema order.

use crate::error::{Error, Result};
use crate::projection::{CellValue, FinalTable, TargetSchema};
use crate::types::ColumnType;
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Arrow data type for a warehouse column type
pub fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::String => DataType::Utf8,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::Date => DataType::Date32,
    }
}

/// Arrow schema for the target schema; every field is nullable
pub fn arrow_schema(schema: &TargetSchema) -> Schema {
    Schema::new(
        schema
            .columns()
            .iter()
            .map(|c| Field::new(c.name, arrow_type(c.column_type), true))
            .collect::<Vec<_>>(),
    )
}

/// Days since the Unix epoch, as stored in a `Date32` column
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Convert a final table into a single RecordBatch
pub fn to_record_batch(table: &FinalTable, schema: &TargetSchema) -> Result<RecordBatch> {
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.len());

    for column in schema.columns() {
        let cells = table
            .rows
            .iter()
            .map(|row| {
                row.get(column.name).ok_or_else(|| {
                    Error::output(format!("row has no value for column '{}'", column.name))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let array: ArrayRef = match column.column_type {
            ColumnType::String => Arc::new(
                cells
                    .iter()
                    .map(|c| match c {
                        CellValue::String(v) => Ok(*v),
                        other => Err(type_mismatch(column.name, other)),
                    })
                    .collect::<Result<StringArray>>()?,
            ),
            ColumnType::Float64 => Arc::new(
                cells
                    .iter()
                    .map(|c| match c {
                        CellValue::Float64(v) => Ok(*v),
                        other => Err(type_mismatch(column.name, other)),
                    })
                    .collect::<Result<Float64Array>>()?,
            ),
            ColumnType::Date => Arc::new(
                cells
                    .iter()
                    .map(|c| match c {
                        CellValue::Date(v) => Ok(v.map(date_to_days)),
                        other => Err(type_mismatch(column.name, other)),
                    })
                    .collect::<Result<Date32Array>>()?,
            ),
        };
        arrays.push(array);
    }

    Ok(RecordBatch::try_new(Arc::new(arrow_schema(schema)), arrays)?)
}

fn type_mismatch(column: &str, cell: &CellValue<'_>) -> Error {
    Error::output(format!("column '{column}' got a mismatched cell {cell:?}"))
}
