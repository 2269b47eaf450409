//! Typed output rows

use chrono::NaiveDate;

/// One projected booking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingRow {
    /// Booker name
    pub name: Option<String>,
    /// Booker email
    pub email: Option<String>,
    /// First cost center
    pub cost_centers: Option<String>,
    /// Month of travel, e.g. `Jan-24`
    pub travel_month: Option<String>,
    /// Trip name
    pub trip_name: Option<String>,
    /// Grand total in USD
    pub usd_grand_total: Option<f64>,
    /// Saving against the optimal price
    pub saving: Option<f64>,
    /// Optimal price
    pub optimal_price: Option<f64>,
    /// Payment schedule
    pub payment_schedule: Option<String>,
    /// Payment method
    pub payment_method_used: Option<String>,
    /// Trip purpose
    pub purpose: Option<String>,
    /// Trip description
    pub trip_description: Option<String>,
    /// Inventory source
    pub inventory: Option<String>,
    /// Booking status
    pub booking_status: Option<String>,
    /// Start date (UTC)
    pub start_date: Option<NaiveDate>,
    /// Vendor
    pub vendor: Option<String>,
    /// Booking type
    pub booking_type: Option<String>,
    /// Booking id
    pub uuid: Option<String>,
}

/// A single cell borrowed from a [`BookingRow`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    /// STRING column
    String(Option<&'a str>),
    /// FLOAT64 column
    Float64(Option<f64>),
    /// DATE column
    Date(Option<NaiveDate>),
}

impl CellValue<'_> {
    /// Whether the cell is NULL
    pub fn is_null(&self) -> bool {
        match self {
            Self::String(v) => v.is_none(),
            Self::Float64(v) => v.is_none(),
            Self::Date(v) => v.is_none(),
        }
    }
}

impl BookingRow {
    /// Cell for destination column `column`
    pub fn get(&self, column: &str) -> Option<CellValue<'_>> {
        fn s(v: &Option<String>) -> CellValue<'_> {
            CellValue::String(v.as_deref())
        }

        Some(match column {
            "name" => s(&self.name),
            "email" => s(&self.email),
            "costCenters" => s(&self.cost_centers),
            "travelMonth" => s(&self.travel_month),
            "tripName" => s(&self.trip_name),
            "usdGrandTotal" => CellValue::Float64(self.usd_grand_total),
            "saving" => CellValue::Float64(self.saving),
            "optimalPrice" => CellValue::Float64(self.optimal_price),
            "paymentSchedule" => s(&self.payment_schedule),
            "paymentMethodUsed" => s(&self.payment_method_used),
            "purpose" => s(&self.purpose),
            "tripDescription" => s(&self.trip_description),
            "inventory" => s(&self.inventory),
            "bookingStatus" => s(&self.booking_status),
            "startDate" => CellValue::Date(self.start_date),
            "vendor" => s(&self.vendor),
            "bookingType" => s(&self.booking_type),
            "uuid" => s(&self.uuid),
            _ => return None,
        })
    }
}

/// Rows ready for loading
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalTable {
    /// Projected rows in arrival order
    pub rows: Vec<BookingRow>,
    /// Rows that failed the required field check
    pub dropped: usize,
}

impl FinalTable {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there is nothing to load
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
