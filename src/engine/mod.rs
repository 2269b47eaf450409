//! Execution engine module
//!
//! # Overview
//!
//! `Pipeline` runs one ETL pass, strictly in sequence:
//!
//! 1. resolve the vendor client credentials
//! 2. mint the session token
//! 3. discover the page count and walk every page
//! 4. normalize and accumulate each fetched page
//! 5. project onto the target schema
//! 6. load, unless the final table is empty

mod types;

pub use types::{format_elapsed, RunOutcome, RunStats};

use crate::auth::TokenMinter;
use crate::config::{EtlConfig, SecretsConfig, VendorConfig};
use crate::error::Result;
use crate::load::{LoadJobConfig, TableRef, WarehouseLoader};
use crate::normalize::{AccumulatedTable, PageVerdict, RowNormalizer};
use crate::pagination::{BookingsFetcher, FetchWindow, PageOutcome, PaginationState};
use crate::projection::SchemaProjector;
use crate::secrets::{resolve_client_credentials, SecretProvider};
use std::time::Instant;
use tracing::{debug, info, warn};

/// One ETL run from the vendor API to the warehouse
pub struct Pipeline {
    vendor: VendorConfig,
    secrets: SecretsConfig,
    secret_provider: Box<dyn SecretProvider>,
    loader: Box<dyn WarehouseLoader>,
    load_config: LoadJobConfig,
    normalizer: RowNormalizer,
    projector: SchemaProjector,
    window: Option<FetchWindow>,
    stats: RunStats,
}

impl Pipeline {
    /// Create a pipeline from validated config and its collaborators
    pub fn new(
        config: &EtlConfig,
        secret_provider: Box<dyn SecretProvider>,
        loader: Box<dyn WarehouseLoader>,
    ) -> Result<Self> {
        let destination = TableRef::parse(&config.destination.table)?;
        Ok(Self {
            vendor: config.vendor.clone(),
            secrets: config.secrets.clone(),
            secret_provider,
            loader,
            load_config: LoadJobConfig::full_replace(destination),
            normalizer: RowNormalizer::new(config.normalize.missing_start_date),
            projector: SchemaProjector::new(),
            window: None,
            stats: RunStats::default(),
        })
    }

    /// Pin the creation window instead of using "everything until now"
    #[must_use]
    pub fn with_window(mut self, window: FetchWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Statistics of the last run
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Run the job once
    ///
    /// Credential, token and discovery failures abort before anything is
    /// loaded. Failed or rejected pages are skipped and counted.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        let start = Instant::now();
        self.stats = RunStats::default();
        info!(
            "Starting ETL into {} via {}",
            self.load_config.destination,
            self.loader.name()
        );

        let credentials =
            resolve_client_credentials(self.secret_provider.as_ref(), &self.secrets).await?;
        let token = TokenMinter::new(&self.vendor)?.mint(&credentials).await?;

        let window = self.window.unwrap_or_else(FetchWindow::until_now);
        let fetcher = BookingsFetcher::new(&self.vendor, &token, window)?;
        let table = self.extract(&fetcher).await?;
        self.stats.rows_accumulated = table.len();

        let final_table = self.projector.project(&table);
        self.stats.rows_dropped += final_table.dropped;

        if final_table.is_empty() {
            warn!("Final table has no records, nothing to load");
            self.stats.set_duration(start.elapsed());
            return Ok(RunOutcome::Empty);
        }

        let receipt = self.loader.load(&final_table, &self.load_config).await?;
        self.stats.rows_loaded = receipt.rows_loaded;
        self.stats.set_duration(start.elapsed());

        info!("Time Taken in complete ETL: {}", format_elapsed(start.elapsed()));
        info!("ETL Finished, Loaded {} number of rows", receipt.rows_loaded);
        Ok(RunOutcome::Loaded { receipt })
    }

    /// Discover the page count, then fetch and accumulate every page in order
    pub async fn extract(&mut self, fetcher: &BookingsFetcher) -> Result<AccumulatedTable> {
        let discovery = fetcher.discover().await?;
        let mut state = PaginationState::new(discovery.total_pages);
        let mut first_page = Some(discovery.first_page);
        let mut table = AccumulatedTable::new();
        info!("Fetching {} pages", discovery.total_pages);

        while let Some(page) = state.advance() {
            let outcome = match (page, first_page.take()) {
                (0, Some(decoded)) => PageOutcome::Fetched(decoded),
                _ => fetcher.fetch_page(page).await,
            };
            state.record(&outcome);

            let PageOutcome::Fetched(decoded) = outcome else {
                continue;
            };
            match self.normalizer.append_page(&mut table, page, &decoded.records) {
                PageVerdict::Rejected { reason } => {
                    debug!("Page {page} rejected: {reason}");
                    self.stats.pages_rejected += 1;
                }
                verdict => self.stats.rows_dropped += verdict.rows_dropped(),
            }
        }

        self.stats.pages_total = state.total_pages;
        self.stats.pages_fetched = state.pages_fetched;
        self.stats.pages_failed = state.pages_failed;
        self.stats.records_fetched = state.records_fetched;
        Ok(table)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("destination", &self.load_config.destination)
            .field("loader", &self.loader.name())
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}
