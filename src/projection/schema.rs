//! Target table schema

use crate::types::{ColumnMode, ColumnType};
use serde_json::{json, Value};

/// One destination column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Destination column name
    pub name: &'static str,
    /// Flattened source key
    pub source: &'static str,
    /// Warehouse type
    pub column_type: ColumnType,
    /// Warehouse mode
    pub mode: ColumnMode,
}

impl ColumnSpec {
    const fn new(name: &'static str, source: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            source,
            column_type,
            mode: ColumnMode::Nullable,
        }
    }

    const fn string(name: &'static str) -> Self {
        Self::new(name, name, ColumnType::String)
    }

    const fn float(name: &'static str) -> Self {
        Self::new(name, name, ColumnType::Float64)
    }
}

const BOOKING_COLUMNS: [ColumnSpec; 18] = [
    ColumnSpec::new("name", "booker.name", ColumnType::String),
    ColumnSpec::new("email", "booker.email", ColumnType::String),
    ColumnSpec::string("costCenters"),
    ColumnSpec::string("travelMonth"),
    ColumnSpec::string("tripName"),
    ColumnSpec::float("usdGrandTotal"),
    ColumnSpec::float("saving"),
    ColumnSpec::float("optimalPrice"),
    ColumnSpec::string("paymentSchedule"),
    ColumnSpec::string("paymentMethodUsed"),
    ColumnSpec::string("purpose"),
    ColumnSpec::string("tripDescription"),
    ColumnSpec::string("inventory"),
    ColumnSpec::string("bookingStatus"),
    ColumnSpec::new("startDate", "startDate", ColumnType::Date),
    ColumnSpec::string("vendor"),
    ColumnSpec::string("bookingType"),
    ColumnSpec::string("uuid"),
];

/// Ordered destination columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSchema {
    columns: Vec<ColumnSpec>,
}

impl Default for TargetSchema {
    fn default() -> Self {
        Self::bookings()
    }
}

impl TargetSchema {
    /// The bookings table layout
    pub fn bookings() -> Self {
        Self {
            columns: BOOKING_COLUMNS.to_vec(),
        }
    }

    /// Columns in output order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Column names in output order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Look up a column by destination name
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// BigQuery `TableSchema.fields` representation
    pub fn to_bigquery_fields(&self) -> Value {
        Value::Array(
            self.columns
                .iter()
                .map(|c| {
                    json!({
                        "name": c.name,
                        "type": c.column_type.as_str(),
                        "mode": c.mode.as_str(),
                    })
                })
                .collect(),
        )
    }
}
