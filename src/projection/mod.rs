//! Schema projection
//!
//! Turns the accumulated, flattened rows into typed rows with exactly the
//! destination columns: renames, type coercion and cost center extraction.

mod projector;
mod row;
mod schema;

pub use projector::{coerce_f64, coerce_string, first_cost_center, SchemaProjector};
pub use row::{BookingRow, CellValue, FinalTable};
pub use schema::{ColumnSpec, TargetSchema};

#[cfg(test)]
mod tests;
