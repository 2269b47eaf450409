//! Decoder implementations

use super::types::{DecodedPage, DecoderConfig, PageDecoder};
use crate::error::{Error, Result};
use crate::types::JsonValue;

// ============================================================================
// Bookings Decoder
// ============================================================================

/// Decodes the `{page: {totalPages}, data: [...]}` envelope
#[derive(Debug, Clone, Default)]
pub struct BookingsDecoder {
    config: DecoderConfig,
}

impl BookingsDecoder {
    /// Create a decoder for the default envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with custom paths
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode an already parsed body
    pub fn decode_value(&self, value: &JsonValue) -> Result<DecodedPage> {
        let total_pages = match extract_simple_path(value, &self.config.total_pages_path) {
            None | Some(JsonValue::Null) => None,
            Some(v) => Some(parse_page_count(v).ok_or_else(|| {
                Error::decode(format!(
                    "'{}' is not a page count: {v}",
                    self.config.total_pages_path
                ))
            })?),
        };

        let records = match extract_simple_path(value, &self.config.records_path) {
            Some(JsonValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    JsonValue::Object(map) => Ok(map.clone()),
                    other => Err(Error::decode(format!(
                        "record {i} is not an object: {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(JsonValue::Null) => Vec::new(),
            Some(other) => {
                return Err(Error::decode(format!(
                    "'{}' is not an array: {other}",
                    self.config.records_path
                )))
            }
            None => {
                return Err(Error::decode(format!(
                    "response has no '{}' field",
                    self.config.records_path
                )))
            }
        };

        Ok(DecodedPage {
            total_pages,
            records,
        })
    }
}

impl PageDecoder for BookingsDecoder {
    fn decode(&self, body: &str) -> Result<DecodedPage> {
        let value: JsonValue = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
        self.decode_value(&value)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Page counts arrive as integers, occasionally as integral floats or strings
fn parse_page_count(value: &JsonValue) -> Option<u32> {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Walk a dotted path (`page.totalPages`, optionally prefixed by `$.`)
pub(crate) fn extract_simple_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            JsonValue::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => current.get(part)?,
        };
    }
    Some(current)
}
