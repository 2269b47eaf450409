//! CLI runner - executes commands

use crate::auth::{google_auth_from_env, AuthConfig};
use crate::cli::commands::{Cli, Commands};
use crate::config::EtlConfig;
use crate::engine::{Pipeline, RunOutcome};
use crate::error::{Error, Result};
use crate::load::{BigQueryLoader, DuckDbLoader, ParquetObjectLoader, WarehouseLoader};
use crate::projection::TargetSchema;
use crate::secrets::{EnvSecretProvider, SecretManagerProvider, SecretProvider};
use crate::types::{SecretProviderKind, SinkKind};
use serde_json::{json, Value};
use tracing::info;

/// CLI runner
#[derive(Debug)]
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.command() {
            Commands::Run => self.run_pipeline().await,
            Commands::Schema => self.schema(),
            Commands::Validate => self.validate(),
        }
    }

    /// Effective configuration: file (or defaults), then flag overrides
    pub fn config(&self) -> Result<EtlConfig> {
        let mut config = match &self.cli.config {
            Some(path) => EtlConfig::from_file(path)?,
            None => EtlConfig::default(),
        };

        if let Some(project_id) = &self.cli.project_id {
            config.project_id = Some(project_id.clone());
        }
        if let Some(sink) = self.cli.sink {
            config.destination.sink = sink;
        }
        if let Some(destination) = &self.cli.destination {
            config.destination.table = destination.clone();
        }

        config.validate()?;
        if needs_project_id(&config) {
            config.require_project_id()?;
        }
        Ok(config)
    }

    async fn run_pipeline(&self) -> Result<()> {
        let config = self.config()?;
        let secret_provider = build_secret_provider(&config)?;
        let loader = build_loader(&config)?;

        let mut pipeline = Pipeline::new(&config, secret_provider, loader)?;
        let outcome = pipeline.run().await?;

        let status = match &outcome {
            RunOutcome::Loaded { .. } => "LOADED",
            RunOutcome::Empty => "EMPTY",
        };
        self.output_message(&json!({
            "type": "RESULT",
            "status": status,
            "destination": config.destination.table,
            "rows": outcome.rows_loaded(),
            "stats": pipeline.stats(),
        }));
        Ok(())
    }

    /// Print the target schema
    fn schema(&self) -> Result<()> {
        self.output_message(&TargetSchema::bookings().to_bigquery_fields());
        Ok(())
    }

    /// Validate the effective configuration
    fn validate(&self) -> Result<()> {
        let config = self.config()?;
        info!(
            "Configuration is valid: {} via {:?}",
            config.destination.table, config.destination.sink
        );
        let yaml = serde_yaml::to_string(&config)?;
        print!("{yaml}");
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        let rendered = if self.cli.pretty {
            serde_json::to_string_pretty(msg)
        } else {
            serde_json::to_string(msg)
        };
        println!("{}", rendered.unwrap_or_default());
    }
}

/// Secret Manager and BigQuery both bill a GCP project
fn needs_project_id(config: &EtlConfig) -> bool {
    config.secrets.provider == SecretProviderKind::SecretManager
        || config.destination.sink == SinkKind::Bigquery
}

fn google_auth(config: &EtlConfig) -> Result<AuthConfig> {
    google_auth_from_env(&config.gcp)
}

/// Secret provider selected by `secrets.provider`
pub fn build_secret_provider(config: &EtlConfig) -> Result<Box<dyn SecretProvider>> {
    match config.secrets.provider {
        SecretProviderKind::SecretManager => {
            let project_id = config.require_project_id()?;
            Ok(Box::new(SecretManagerProvider::new(
                config.gcp.secret_manager_url.clone(),
                project_id,
                google_auth(config)?,
            )?))
        }
        SecretProviderKind::Env => Ok(Box::new(EnvSecretProvider::new())),
    }
}

/// Loader selected by `destination.sink`
pub fn build_loader(config: &EtlConfig) -> Result<Box<dyn WarehouseLoader>> {
    match config.destination.sink {
        SinkKind::Bigquery => {
            let project_id = config.require_project_id()?;
            Ok(Box::new(BigQueryLoader::new(
                &config.gcp,
                project_id,
                google_auth(config)?,
            )?))
        }
        SinkKind::Duckdb => {
            if config.destination.duckdb_path.trim().is_empty() {
                return Err(Error::invalid_value(
                    "destination.duckdb_path",
                    "must not be empty",
                ));
            }
            Ok(Box::new(DuckDbLoader::new(&config.destination.duckdb_path)))
        }
        SinkKind::Parquet => Ok(Box::new(ParquetObjectLoader::new(
            &config.destination.output_url,
        )?)),
    }
}
