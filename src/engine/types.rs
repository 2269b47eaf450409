//! Engine types
//!
//! Outcome and counters of one ETL run.

use crate::load::LoadReceipt;
use serde::Serialize;
use std::time::Duration;

/// How a run ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The final table was committed
    Loaded {
        /// Receipt from the loader
        receipt: LoadReceipt,
    },
    /// Nothing survived normalization; no load was submitted
    Empty,
}

impl RunOutcome {
    /// Rows committed by this run
    pub fn rows_loaded(&self) -> usize {
        match self {
            Self::Loaded { receipt } => receipt.rows_loaded,
            Self::Empty => 0,
        }
    }

    /// Check if a load happened
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Statistics from one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Page count from discovery
    pub pages_total: u32,
    /// Pages that came back with HTTP 200
    pub pages_fetched: u32,
    /// Pages skipped after a request failure
    pub pages_failed: u32,
    /// Pages dropped by the start date check
    pub pages_rejected: u32,
    /// Records received
    pub records_fetched: u64,
    /// Rows in the accumulated table
    pub rows_accumulated: usize,
    /// Rows dropped by normalization or projection
    pub rows_dropped: usize,
    /// Rows committed
    pub rows_loaded: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Set duration
    pub fn set_duration(&mut self, elapsed: Duration) {
        self.duration_ms = elapsed.as_millis() as u64;
    }
}

/// Format a duration as `HH:MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
