//! Tests for decoder module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

#[test]
fn test_decode_envelope() {
    let body = json!({
        "page": { "totalPages": 3, "currentPage": 0 },
        "data": [
            { "uuid": "a", "booker": { "name": "Ann" } },
            { "uuid": "b" }
        ]
    })
    .to_string();

    let page = BookingsDecoder::new().decode(&body).unwrap();

    assert_eq!(page.total_pages, Some(3));
    assert_eq!(page.len(), 2);
    assert_eq!(page.records[0]["uuid"], json!("a"));
    assert_eq!(page.records[1]["uuid"], json!("b"));
}

#[test]
fn test_decode_null_data_is_empty() {
    let page = BookingsDecoder::new()
        .decode(r#"{"page":{"totalPages":0},"data":null}"#)
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_pages, Some(0));
}

#[test]
fn test_decode_missing_page_metadata() {
    let page = BookingsDecoder::new().decode(r#"{"data":[]}"#).unwrap();
    assert_eq!(page.total_pages, None);
}

#[test_case(r#"{"page":{"totalPages":2}}"# ; "missing data")]
#[test_case(r#"{"data":{"uuid":"x"}}"# ; "data not an array")]
#[test_case(r#"{"data":[1, 2]}"# ; "records not objects")]
#[test_case(r#"{"page":{"totalPages":"many"},"data":[]}"# ; "bad page count")]
#[test_case("not json" ; "invalid json")]
fn test_decode_errors(body: &str) {
    let err = BookingsDecoder::new().decode(body).unwrap_err();
    assert!(matches!(err, crate::error::Error::Decode { .. }));
}

#[test_case(json!(4), Some(4) ; "integer")]
#[test_case(json!(4.0), Some(4) ; "integral float")]
#[test_case(json!("7"), Some(7) ; "numeric string")]
fn test_page_count_forms(total: serde_json::Value, expected: Option<u32>) {
    let body = json!({ "page": { "totalPages": total }, "data": [] }).to_string();
    let page = BookingsDecoder::new().decode(&body).unwrap();
    assert_eq!(page.total_pages, expected);
}

#[test]
fn test_custom_paths() {
    let decoder = BookingsDecoder::with_config(
        DecoderConfig::default()
            .with_records_path("result.items")
            .with_total_pages_path("$.meta.pages"),
    );
    let body = json!({
        "meta": { "pages": 1 },
        "result": { "items": [ { "uuid": "z" } ] }
    })
    .to_string();

    let page = decoder.decode(&body).unwrap();
    assert_eq!(page.total_pages, Some(1));
    assert_eq!(page.records.len(), 1);
}

#[test]
fn test_extract_simple_path() {
    let value = json!({ "a": { "b": [ { "c": 1 } ] } });
    assert_eq!(extract_simple_path(&value, "a.b.0.c"), Some(&json!(1)));
    assert_eq!(extract_simple_path(&value, "$.a.b.0.c"), Some(&json!(1)));
    assert_eq!(extract_simple_path(&value, "a.x"), None);
    assert_eq!(extract_simple_path(&value, "$"), Some(&value));
}
