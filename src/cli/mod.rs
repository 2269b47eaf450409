//! CLI module
//!
//! Command-line interface for the bookings ETL.
//!
//! # Commands
//!
//! - `run` - Extract bookings and replace the destination table (default)
//! - `schema` - Print the target schema
//! - `validate` - Check the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::{build_loader, build_secret_provider, Runner};

#[cfg(test)]
mod tests;
