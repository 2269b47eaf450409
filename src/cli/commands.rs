//! CLI commands and argument parsing

use crate::types::SinkKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TripActions bookings ETL
#[derive(Parser, Debug)]
#[command(name = "tripaction-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// GCP project holding the secrets and billing the load job
    #[arg(
        short = 'p',
        long = "project_id",
        visible_alias = "project-id",
        global = true
    )]
    pub project_id: Option<String>,

    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Where the final table is committed
    #[arg(long, global = true, value_enum)]
    pub sink: Option<SinkKind>,

    /// Destination table (`dataset.table` or `project.dataset.table`)
    #[arg(long, global = true)]
    pub destination: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Extract all bookings and replace the destination table (default)
    Run,

    /// Print the target table schema as BigQuery JSON
    Schema,

    /// Check the effective configuration without contacting any service
    Validate,
}

impl Cli {
    /// The subcommand, defaulting to `run`
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}
