//! Tests for schema projection

use super::*;
use crate::normalize::{AccumulatedTable, RowNormalizer};
use crate::types::{ColumnType, JsonObject, MissingStartDate};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn accumulate(records: Vec<serde_json::Value>, policy: MissingStartDate) -> AccumulatedTable {
    let records: Vec<JsonObject> = records
        .into_iter()
        .map(|r| match r {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        })
        .collect();
    let mut table = AccumulatedTable::new();
    RowNormalizer::new(policy).append_page(&mut table, 0, &records);
    table
}

// ============================================================================
// Schema
// ============================================================================

#[test]
fn test_schema_column_order() {
    assert_eq!(
        TargetSchema::bookings().column_names(),
        vec![
            "name",
            "email",
            "costCenters",
            "travelMonth",
            "tripName",
            "usdGrandTotal",
            "saving",
            "optimalPrice",
            "paymentSchedule",
            "paymentMethodUsed",
            "purpose",
            "tripDescription",
            "inventory",
            "bookingStatus",
            "startDate",
            "vendor",
            "bookingType",
            "uuid",
        ]
    );
}

#[test]
fn test_schema_types() {
    let schema = TargetSchema::bookings();
    assert_eq!(schema.column("startDate").unwrap().column_type, ColumnType::Date);
    assert_eq!(schema.column("saving").unwrap().column_type, ColumnType::Float64);
    assert_eq!(schema.column("name").unwrap().source, "booker.name");
    assert!(schema.column("booker").is_none());

    let fields = schema.to_bigquery_fields();
    let fields = fields.as_array().unwrap();
    assert_eq!(fields.len(), 18);
    assert_eq!(
        fields[5],
        json!({"name": "usdGrandTotal", "type": "FLOAT64", "mode": "NULLABLE"})
    );
}

#[test]
fn test_every_schema_column_has_a_cell() {
    let row = BookingRow::default();
    for column in TargetSchema::bookings().columns() {
        assert!(row.get(column.name).is_some(), "no cell for {}", column.name);
    }
    assert!(row.get("notAColumn").is_none());
}

#[test]
fn test_booking_row_cells_borrow_values() {
    let row = BookingRow {
        email: Some("ann@example.com".to_string()),
        saving: Some(3.5),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 5),
        ..Default::default()
    };

    assert_eq!(row.get("email"), Some(CellValue::String(Some("ann@example.com"))));
    assert_eq!(row.get("purpose"), Some(CellValue::String(None)));
    assert_eq!(row.get("saving"), Some(CellValue::Float64(Some(3.5))));
    assert_eq!(
        row.get("startDate"),
        Some(CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5)))
    );
    assert!(row.get("purpose").is_some_and(|cell| cell.is_null()));
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_project_example_booking() {
    let table = accumulate(
        vec![json!({
            "uuid": "u-1",
            "booker": { "name": "Ann Lee", "email": "ann@example.com" },
            "costCenters": "['CC100']",
            "startDate": "2024-01-05",
            "tripName": "Offsite",
            "usdGrandTotal": 512.25,
            "saving": "12.5",
            "optimalPrice": null,
            "bookingStatus": "TICKETED",
            "vendor": "Delta",
            "bookingType": "FLIGHT",
            "internalOnly": "never exported"
        })],
        MissingStartDate::DropPage,
    );

    let final_table = SchemaProjector::new().project(&table);

    assert_eq!(final_table.len(), 1);
    assert_eq!(final_table.dropped, 0);
    let row = &final_table.rows[0];
    assert_eq!(row.name.as_deref(), Some("Ann Lee"));
    assert_eq!(row.email.as_deref(), Some("ann@example.com"));
    assert_eq!(row.cost_centers.as_deref(), Some("CC100"));
    assert_eq!(row.travel_month.as_deref(), Some("Jan-24"));
    assert_eq!(row.start_date, NaiveDate::from_ymd_opt(2024, 1, 5));
    assert_eq!(row.usd_grand_total, Some(512.25));
    assert_eq!(row.saving, Some(12.5));
    assert_eq!(row.optimal_price, None);
    assert_eq!(row.purpose, None);
    assert_eq!(row.uuid.as_deref(), Some("u-1"));
}

#[test]
fn test_project_datetime_start_date_truncated_in_utc() {
    let table = accumulate(
        vec![json!({ "uuid": "u", "startDate": "2024-03-31T22:00:00-04:00" })],
        MissingStartDate::DropPage,
    );

    let final_table = SchemaProjector::new().project(&table);
    assert_eq!(
        final_table.rows[0].start_date,
        NaiveDate::from_ymd_opt(2024, 4, 1)
    );
    assert_eq!(final_table.rows[0].travel_month.as_deref(), Some("Mar-24"));
}

#[test]
fn test_project_drops_rows_without_start_date() {
    let mut row = JsonObject::new();
    row.insert("uuid".to_string(), json!("x"));
    row.insert("startDate".to_string(), json!("not a date"));

    let projector = SchemaProjector::new();
    assert!(projector.project_row(&row).is_none());
}

#[test]
fn test_project_empty_table() {
    let final_table = SchemaProjector::new().project(&AccumulatedTable::new());
    assert!(final_table.is_empty());
}

#[test]
fn test_project_preserves_order() {
    let table = accumulate(
        vec![
            json!({ "uuid": "b", "startDate": "2024-01-01" }),
            json!({ "uuid": "a", "startDate": "2024-01-02" }),
        ],
        MissingStartDate::DropPage,
    );

    let uuids: Vec<_> = SchemaProjector::new()
        .project(&table)
        .rows
        .into_iter()
        .filter_map(|r| r.uuid)
        .collect();
    assert_eq!(uuids, vec!["b".to_string(), "a".to_string()]);
}

// ============================================================================
// Coercion
// ============================================================================

#[test_case(json!("['CC100']"), Some("CC100") ; "stringified list")]
#[test_case(json!("['CC100', 'CC200']"), Some("CC100") ; "stringified list keeps first")]
#[test_case(json!("[]"), None ; "stringified empty list")]
#[test_case(json!("CC300"), None ; "unquoted string")]
#[test_case(json!(["CC100", "CC200"]), Some("CC100") ; "json list")]
#[test_case(json!([{"name": "Sales", "id": "7"}]), Some("Sales") ; "json list of objects")]
#[test_case(json!([]), None ; "empty json list")]
#[test_case(json!(null), None ; "null")]
fn test_first_cost_center(value: serde_json::Value, expected: Option<&str>) {
    assert_eq!(first_cost_center(&value).as_deref(), expected);
}

#[test_case(json!(1.5), Some(1.5) ; "float")]
#[test_case(json!(42), Some(42.0) ; "integer")]
#[test_case(json!(" 7.25 "), Some(7.25) ; "numeric string")]
#[test_case(json!("n/a"), None ; "non numeric string")]
#[test_case(json!(null), None ; "null")]
#[test_case(json!(true), None ; "bool")]
fn test_coerce_f64(value: serde_json::Value, expected: Option<f64>) {
    assert_eq!(coerce_f64(&value), expected);
}

#[test_case(json!("x"), Some("x") ; "string")]
#[test_case(json!(3), Some("3") ; "number")]
#[test_case(json!(false), Some("false") ; "bool")]
#[test_case(json!(null), None ; "null")]
fn test_coerce_string(value: serde_json::Value, expected: Option<&str>) {
    assert_eq!(coerce_string(&value).as_deref(), expected);
}
