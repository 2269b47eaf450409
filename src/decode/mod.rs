//! Response decoder module
//!
//! The bookings endpoint wraps each page in an envelope:
//!
//! ```json
//! { "page": { "totalPages": 3 }, "data": [ { "uuid": "..." } ] }
//! ```
//!
//! Only `page.totalPages` and `data` are read; anything else is ignored.

mod decoders;
mod types;

pub use decoders::BookingsDecoder;
pub(crate) use decoders::extract_simple_path;
pub use types::{DecodedPage, DecoderConfig, PageDecoder};

#[cfg(test)]
mod tests;
