//! Accumulated table to final table

use super::row::{BookingRow, FinalTable};
use super::schema::TargetSchema;
use crate::normalize::{parse_start_date, AccumulatedTable};
use crate::types::{JsonObject, JsonValue};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// First single-quoted token of a stringified list, e.g. `['CC100', 'CC200']`
static QUOTED_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']*)'").unwrap());

/// Projects flattened rows onto the target schema
#[derive(Debug, Clone, Default)]
pub struct SchemaProjector {
    schema: TargetSchema,
}

impl SchemaProjector {
    /// Create a projector for the bookings schema
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema rows are projected onto
    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    /// Project every accumulated row
    ///
    /// Rows whose `startDate` does not coerce to a date are dropped and
    /// counted in [`FinalTable::dropped`].
    pub fn project(&self, table: &AccumulatedTable) -> FinalTable {
        let mut out = FinalTable {
            rows: Vec::with_capacity(table.len()),
            dropped: 0,
        };

        for row in table.rows() {
            match self.project_row(row) {
                Some(projected) => out.rows.push(projected),
                None => out.dropped += 1,
            }
        }

        if out.dropped > 0 {
            warn!("Dropped {} rows failing the required field check", out.dropped);
        }
        debug!("Projected {} rows onto {} columns", out.len(), self.schema.len());
        out
    }

    /// Project one flattened row, `None` if it fails the required field check
    pub fn project_row(&self, row: &JsonObject) -> Option<BookingRow> {
        let start_date = Some(row.get("startDate").and_then(parse_start_date)?);
        let text = |key: &str| row.get(key).and_then(coerce_string);
        let money = |key: &str| row.get(key).and_then(coerce_f64);

        Some(BookingRow {
            name: text("booker.name"),
            email: text("booker.email"),
            cost_centers: row.get("costCenters").and_then(first_cost_center),
            travel_month: text("travelMonth"),
            trip_name: text("tripName"),
            usd_grand_total: money("usdGrandTotal"),
            saving: money("saving"),
            optimal_price: money("optimalPrice"),
            payment_schedule: text("paymentSchedule"),
            payment_method_used: text("paymentMethodUsed"),
            purpose: text("purpose"),
            trip_description: text("tripDescription"),
            inventory: text("inventory"),
            booking_status: text("bookingStatus"),
            start_date,
            vendor: text("vendor"),
            booking_type: text("bookingType"),
            uuid: text("uuid"),
        })
    }
}

// ============================================================================
// Coercion
// ============================================================================

/// Render a payload value as STRING; NULL stays NULL
pub fn coerce_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Read a payload value as FLOAT64; non-numeric values become NULL
pub fn coerce_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Keep only the first cost center
///
/// A JSON list yields its first element. A string is read as a stringified
/// list and yields its first single-quoted token, or NULL when it has none.
pub fn first_cost_center(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Array(items) => items.first().and_then(cost_center_name),
        JsonValue::String(s) => QUOTED_TOKEN_REGEX
            .captures(s)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
        JsonValue::Null => None,
        other => coerce_string(other),
    }
}

fn cost_center_name(item: &JsonValue) -> Option<String> {
    match item {
        JsonValue::Object(map) => map
            .get("name")
            .and_then(coerce_string)
            .or_else(|| coerce_string(item)),
        other => coerce_string(other),
    }
}
