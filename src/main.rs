//! visa-sync CLI: keeps the visa category taxonomy in line with the
//! knowledge oracle and scrapes visa types from a public page.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use visa_sync::db::{establish_connection_pool, run_migrations};
use visa_sync::domain::types::{EndpointUrl, SourceUrl, TypeConstraintError};
use visa_sync::models::config::{AppConfig, ConfigError};
use visa_sync::oracle::{BruceOracle, OpenAiClient};
use visa_sync::repository::errors::RepositoryError;
use visa_sync::repository::{DieselRepository, ScrapeLogListQuery};
use visa_sync::scrape::HtmlTableSource;
use visa_sync::services::ServiceError;
use visa_sync::services::audit_export::export_scrape_log;
use visa_sync::services::bootstrap::bootstrap_categories;
use visa_sync::services::runner::{run_once, run_periodic, run_scrape_once};
use visa_sync::services::scrape_bot::{CategoryMappings, ScrapeContext};
use visa_sync::services::sync::SyncOptions;

#[derive(Parser)]
#[command(name = "visa-sync", version, about = "Visa taxonomy synchronizer")]
struct Cli {
    /// Settings file.
    #[arg(long, global = true, default_value = "config/default.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and the default categories.
    Init,
    /// Run one synchronization pass.
    Sync,
    /// Synchronize periodically until interrupted.
    Run {
        /// Seconds between passes; overrides `sync.interval_secs`.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Scrape visa types once.
    Scrape,
    /// Write the audit log as CSV, newest entries first.
    ExportLog {
        /// Output file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Maximum number of entries.
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open database: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Failed(&'static str),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load(&cli.config)?;

    let pool = establish_connection_pool(&config.database_url)?;
    run_migrations(&pool)?;
    let repo = Arc::new(DieselRepository::new(pool));
    let created = bootstrap_categories(repo.as_ref())?;
    if created > 0 {
        log::info!("Created {created} default categories");
    }

    match cli.command {
        Commands::Init => {
            log::info!("Database {} is ready", config.database_url);
        }
        Commands::Sync => {
            let oracle = Arc::new(build_oracle(&config)?);
            let options = SyncOptions {
                failure_policy: config.sync.failure_policy,
            };
            let cancel = shutdown_token();
            if run_once(repo, oracle, options, cancel).await.is_none() {
                return Err(CliError::Failed("synchronization pass failed"));
            }
        }
        Commands::Run { interval_secs } => {
            let oracle = Arc::new(build_oracle(&config)?);
            let options = SyncOptions {
                failure_policy: config.sync.failure_policy,
            };
            let interval = interval_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.sync.interval());
            log::info!("Synchronizing every {}s", interval.as_secs());
            run_periodic(repo, oracle, options, interval, shutdown_token()).await;
        }
        Commands::Scrape => {
            let source = Arc::new(HtmlTableSource::new(
                SourceUrl::new(config.scraper.source_url.as_str())?,
                &config.scraper,
            ));
            let context = ScrapeContext {
                mappings: CategoryMappings::from_config(&config.scraper)?,
            };
            let report = run_scrape_once(repo, source, context).await;
            if report.error.is_some() {
                return Err(CliError::Failed("visa scrape failed"));
            }
        }
        Commands::ExportLog { output, limit } => {
            let mut query = ScrapeLogListQuery::new();
            if let Some(limit) = limit {
                query = query.paginate(1, limit);
            }
            let bytes = export_scrape_log(repo.as_ref(), query)?;
            match output {
                Some(path) => {
                    fs::write(&path, &bytes)?;
                    log::info!("Audit log written to {}", path.display());
                }
                None => io::stdout().write_all(&bytes)?,
            }
        }
    }

    Ok(())
}

fn build_oracle(config: &AppConfig) -> Result<BruceOracle<OpenAiClient>, CliError> {
    let base_url = EndpointUrl::new(config.oracle.base_url.as_str())?;
    Ok(BruceOracle::new(OpenAiClient::new(base_url, &config.oracle)))
}

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Shutdown requested; finishing the current category");
            trigger.cancel();
        }
    });
    cancel
}
