//! Record flattening and date helpers

use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Separator between nested key segments
pub const KEY_SEPARATOR: char = '.';

/// Flatten nested objects into dotted keys
///
/// `{"booker": {"name": "Ann"}}` becomes `{"booker.name": "Ann"}`. Arrays are
/// kept as values, and empty nested objects contribute no keys.
pub fn flatten_record(record: &JsonObject) -> JsonObject {
    let mut out = JsonObject::new();
    flatten_into(&mut out, None, record);
    out
}

fn flatten_into(out: &mut JsonObject, prefix: Option<&str>, object: &JsonObject) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            JsonValue::Object(nested) => flatten_into(out, Some(&path), nested),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}

/// Parse a `startDate` value into a UTC calendar date
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (converted to UTC first) and
/// naive `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS[.f]` timestamps.
pub fn parse_start_date(value: &JsonValue) -> Option<NaiveDate> {
    parse_date(value, |ts| ts.with_timezone(&Utc).date_naive())
}

/// Parse a `startDate` value into the calendar date at its own offset
///
/// Same formats as [`parse_start_date`], but `2024-01-31T23:30:00-05:00`
/// stays on January 31st.
pub fn parse_local_date(value: &JsonValue) -> Option<NaiveDate> {
    parse_date(value, |ts| ts.date_naive())
}

fn parse_date(
    value: &JsonValue,
    offset_date: impl Fn(DateTime<FixedOffset>) -> NaiveDate,
) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(offset_date(ts));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

/// Abbreviated month and two-digit year, e.g. `Jan-24`
pub fn travel_month(date: NaiveDate) -> String {
    date.format("%b-%y").to_string()
}
