// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # TripActions bookings ETL
//!
//! Pulls every booking from the TripActions REST API, flattens and projects
//! it onto a fixed 18-column schema, and replaces the warehouse table with
//! the result.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tripaction_etl::cli::{build_loader, build_secret_provider};
//! use tripaction_etl::config::EtlConfig;
//! use tripaction_etl::engine::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> tripaction_etl::Result<()> {
//!     let config = EtlConfig::from_file("etl.yaml")?;
//!     let mut pipeline = Pipeline::new(
//!         &config,
//!         build_secret_provider(&config)?,
//!         build_loader(&config)?,
//!     )?;
//!     let outcome = pipeline.run().await?;
//!     println!("loaded {} rows", outcome.rows_loaded());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌────────────┐   ┌───────────┐   ┌───────────┐   ┌────────┐
//! │ Secrets  │──▶│ Minter  │──▶│ Pagination │──▶│ Normalize │──▶│ Projection│──▶│  Load  │
//! ├──────────┤   ├─────────┤   ├────────────┤   ├───────────┤   ├───────────┤   ├────────┤
//! │ SecretMgr│   │ OAuth2  │   │ Discovery  │   │ Flatten   │   │ 18 columns│   │BigQuery│
//! │ Env      │   │ client  │   │ Page loop  │   │ startDate │   │ Coercion  │   │ DuckDB │
//! │          │   │ creds   │   │ Skip fails │   │ travelMon │   │           │   │ Parquet│
//! └──────────┘   └─────────┘   └────────────┘   └───────────┘   └───────────┘   └────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Run configuration
pub mod config;

/// Vendor token minting and Google API authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Secret retrieval
pub mod secrets;

/// Bookings page decoding
pub mod decode;

/// Page discovery and fetching
pub mod pagination;

/// Flattening and start date handling
pub mod normalize;

/// Projection onto the target schema
pub mod projection;

/// Arrow/Parquet output
pub mod output;

/// Warehouse loaders
pub mod load;

/// ETL pipeline
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::EtlConfig;
pub use engine::{Pipeline, RunOutcome, RunStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
