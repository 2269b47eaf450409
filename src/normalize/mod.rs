//! Row normalization
//!
//! Each fetched page is flattened, stamped with `travelMonth` and checked
//! for a usable `startDate` before it joins the accumulated table.

mod flatten;
mod normalizer;

pub use flatten::{
    flatten_record, parse_local_date, parse_start_date, travel_month, KEY_SEPARATOR,
};
pub use normalizer::{
    AccumulatedTable, PageVerdict, RowNormalizer, START_DATE_FIELD, TRAVEL_MONTH_FIELD,
};
