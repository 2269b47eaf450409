//! Page-by-page accumulation

use super::flatten::{flatten_record, parse_local_date, travel_month};
use crate::types::{JsonObject, JsonValue, MissingStartDate};
use tracing::{debug, warn};

/// Flattened field holding the trip start date
pub const START_DATE_FIELD: &str = "startDate";

/// Field derived from the start date
pub const TRAVEL_MONTH_FIELD: &str = "travelMonth";

// ============================================================================
// Accumulated Table
// ============================================================================

/// Flattened rows from every accepted page, in arrival order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulatedTable {
    rows: Vec<JsonObject>,
}

impl AccumulatedTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows have been accepted
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in arrival order
    pub fn rows(&self) -> &[JsonObject] {
        &self.rows
    }

    fn extend(&mut self, rows: Vec<JsonObject>) {
        self.rows.extend(rows);
    }
}

// ============================================================================
// Page Verdict
// ============================================================================

/// What happened to one page's records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageVerdict {
    /// Every record was appended
    Accepted {
        /// Rows appended
        rows: usize,
    },
    /// Nothing from the page was appended
    Rejected {
        /// Why the page was dropped
        reason: String,
    },
    /// Some records were dropped, the rest appended
    Partial {
        /// Rows appended
        rows: usize,
        /// Rows dropped
        dropped: usize,
    },
}

impl PageVerdict {
    /// Rows this page added to the table
    pub fn rows_added(&self) -> usize {
        match self {
            Self::Accepted { rows } | Self::Partial { rows, .. } => *rows,
            Self::Rejected { .. } => 0,
        }
    }

    /// Rows this page lost to the start date check
    pub fn rows_dropped(&self) -> usize {
        match self {
            Self::Partial { dropped, .. } => *dropped,
            _ => 0,
        }
    }
}

// ============================================================================
// Row Normalizer
// ============================================================================

/// Flattens bookings and guards the start date before accumulation
#[derive(Debug, Clone, Copy, Default)]
pub struct RowNormalizer {
    policy: MissingStartDate,
}

impl RowNormalizer {
    /// Create a normalizer with the given missing start date policy
    pub fn new(policy: MissingStartDate) -> Self {
        Self { policy }
    }

    /// The active policy
    pub fn policy(&self) -> MissingStartDate {
        self.policy
    }

    /// Flatten `records` from `page` and append the valid ones to `table`
    pub fn append_page(
        &self,
        table: &mut AccumulatedTable,
        page: u32,
        records: &[JsonObject],
    ) -> PageVerdict {
        let mut rows = Vec::with_capacity(records.len());
        let mut dropped = 0usize;

        for record in records {
            let mut row = flatten_record(record);
            match row.get(START_DATE_FIELD).and_then(parse_local_date) {
                Some(date) => {
                    row.insert(
                        TRAVEL_MONTH_FIELD.to_string(),
                        JsonValue::String(travel_month(date)),
                    );
                    rows.push(row);
                }
                None => dropped += 1,
            }
        }

        if dropped == 0 {
            let count = rows.len();
            table.extend(rows);
            debug!("Page {page}: appended {count} rows");
            return PageVerdict::Accepted { rows: count };
        }

        match self.policy {
            MissingStartDate::DropPage => {
                warn!(
                    "Missing required value: page {page} has {dropped} records \
                     without a usable startDate, skipping page"
                );
                PageVerdict::Rejected {
                    reason: format!("{dropped} records without a usable startDate"),
                }
            }
            MissingStartDate::DropRow => {
                let count = rows.len();
                warn!("Missing required value: dropped {dropped} records from page {page}");
                table.extend(rows);
                PageVerdict::Partial {
                    rows: count,
                    dropped,
                }
            }
        }
    }
}
