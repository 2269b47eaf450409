//! Tests for the CLI

use super::*;
use crate::error::Error;
use crate::types::{SecretProviderKind, SinkKind};
use clap::Parser;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};
use test_case::test_case;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("tripaction-etl").chain(args.iter().copied())).unwrap()
}

#[test_case(&["--project_id", "proj"] ; "underscore long flag")]
#[test_case(&["--project-id", "proj"] ; "dashed alias")]
#[test_case(&["-p", "proj"] ; "short flag")]
fn test_project_id_spellings(args: &[&str]) {
    let cli = parse(args);
    assert_eq!(cli.project_id.as_deref(), Some("proj"));
    assert_eq!(cli.command(), Commands::Run);
}

#[test]
fn test_subcommands_and_globals() {
    let cli = parse(&["schema", "--pretty"]);
    assert_eq!(cli.command(), Commands::Schema);
    assert!(cli.pretty);

    let cli = parse(&["validate", "--sink", "duckdb", "-v"]);
    assert_eq!(cli.command(), Commands::Validate);
    assert_eq!(cli.sink, Some(SinkKind::Duckdb));
    assert!(cli.verbose);
}

#[test]
fn test_unknown_sink_rejected() {
    let result = Cli::try_parse_from(["tripaction-etl", "--sink", "redshift"]);
    assert!(result.is_err());
}

#[test]
fn test_flags_override_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "project_id: from-file\ndestination:\n  table: ds.from_file\n  sink: parquet\nsecrets:\n  provider: env"
    )
    .unwrap();

    let config_path = file.path().to_str().unwrap().to_string();
    let runner = Runner::new(parse(&[
        "--config",
        &config_path,
        "--destination",
        "ds.from_flag",
        "--sink",
        "duckdb",
    ]));
    let config = runner.config().unwrap();

    assert_eq!(config.project_id.as_deref(), Some("from-file"));
    assert_eq!(config.destination.table, "ds.from_flag");
    assert_eq!(config.destination.sink, SinkKind::Duckdb);
    assert_eq!(config.secrets.provider, SecretProviderKind::Env);
}

#[test]
fn test_bigquery_run_requires_project_id() {
    let runner = Runner::new(parse(&[]));
    let err = runner.config().unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_bad_destination_rejected() {
    let runner = Runner::new(parse(&["-p", "proj", "--destination", "nodataset"]));
    assert!(runner.config().is_err());
}

#[test]
fn test_build_local_loaders() {
    let dir = tempdir().unwrap();
    let mut config = crate::config::EtlConfig::default();

    config.destination.sink = SinkKind::Duckdb;
    config.destination.duckdb_path = dir.path().join("w.duckdb").display().to_string();
    assert_eq!(build_loader(&config).unwrap().name(), "duckdb");

    config.destination.sink = SinkKind::Parquet;
    config.destination.output_url = dir.path().display().to_string();
    assert_eq!(build_loader(&config).unwrap().name(), "parquet");
}

#[test]
fn test_bigquery_loader_needs_project() {
    let mut config = crate::config::EtlConfig::default();
    config.destination.sink = SinkKind::Bigquery;
    assert!(build_loader(&config).is_err());
}

#[test]
fn test_env_secret_provider_needs_no_project() {
    let mut config = crate::config::EtlConfig::default();
    config.secrets.provider = SecretProviderKind::Env;
    assert!(build_secret_provider(&config).is_ok());
}
