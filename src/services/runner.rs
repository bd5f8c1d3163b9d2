//! Background execution of the synchronizer and the scrape bot.
//!
//! The store and oracle are blocking, so each pass runs on the blocking
//! thread pool. Failures never escape a pass: they are logged and written to
//! the audit log, and the periodic loop carries on with the next tick.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::domain::scrape_log::NewScrapeLog;
use crate::domain::types::ScrapeAction;
use crate::oracle::KnowledgeOracle;
use crate::repository::{
    CategoryReader, CategoryWriter, ScrapeLogWriter, SubCategoryReader, SubCategoryWriter,
    VisaTypeReader, VisaTypeWriter,
};
use crate::scrape::ScrapeSource;
use crate::services::ServiceError;
use crate::services::scrape_bot::{SCRAPER_ENTITY, ScrapeContext, ScrapeReport, run_scrape};
use crate::services::sync::{SyncOptions, SyncReport, synchronize};

/// Entity name used for run-level audit entries of the synchronizer.
pub const SYNC_ENTITY: &str = "VisaSync";

/// Log `error` and append an `Error` audit entry for `entity`.
///
/// A failing append is only logged.
pub fn record_failure<R>(repo: &R, entity: &str, error: &dyn Display)
where
    R: ScrapeLogWriter + ?Sized,
{
    log::error!("{entity} failed: {error}");
    let entry = NewScrapeLog::now(ScrapeAction::Error, entity, error.to_string());
    if let Err(e) = repo.append_scrape_logs(&[entry]) {
        log::error!("Failed to record {entity} failure: {e}");
    }
}

/// Run one synchronization pass. Returns `None` when the pass failed.
pub async fn run_once<R, O>(
    repo: Arc<R>,
    oracle: Arc<O>,
    options: SyncOptions,
    cancel: CancellationToken,
) -> Option<SyncReport>
where
    R: CategoryReader
        + CategoryWriter
        + SubCategoryReader
        + SubCategoryWriter
        + ScrapeLogWriter
        + Send
        + Sync
        + 'static,
    O: KnowledgeOracle + Send + Sync + 'static,
{
    let worker_repo = Arc::clone(&repo);
    let handle = tokio::task::spawn_blocking(move || {
        synchronize(worker_repo.as_ref(), oracle.as_ref(), &options, &cancel)
    });

    match handle.await {
        Ok(Ok(report)) => {
            log::info!(
                "Visa sync finished: {} categories, {} failed, +{} -{} sub-categories, {} visa type updates",
                report.categories_processed,
                report.categories_failed,
                report.sub_categories_added,
                report.sub_categories_removed,
                report.visa_types_updated
            );
            Some(report)
        }
        Ok(Err(e)) => {
            record_failure(repo.as_ref(), SYNC_ENTITY, &e);
            None
        }
        Err(e) => {
            record_failure(repo.as_ref(), SYNC_ENTITY, &ServiceError::Worker(e.to_string()));
            None
        }
    }
}

/// Run synchronization passes every `interval` until `cancel` fires.
///
/// A pass in flight is never interrupted; cancellation takes effect between
/// categories and while waiting for the next tick. Returns the number of
/// passes started.
pub async fn run_periodic<R, O>(
    repo: Arc<R>,
    oracle: Arc<O>,
    options: SyncOptions,
    interval: Duration,
    cancel: CancellationToken,
) -> usize
where
    R: CategoryReader
        + CategoryWriter
        + SubCategoryReader
        + SubCategoryWriter
        + ScrapeLogWriter
        + Send
        + Sync
        + 'static,
    O: KnowledgeOracle + Send + Sync + 'static,
{
    let mut passes = 0;
    loop {
        if cancel.is_cancelled() {
            break;
        }
        passes += 1;
        log::info!("Starting visa sync pass {passes}");
        run_once(
            Arc::clone(&repo),
            Arc::clone(&oracle),
            options,
            cancel.clone(),
        )
        .await;

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    log::info!("Visa sync loop stopped after {passes} passes");
    passes
}

/// Run the scrape bot once on the blocking pool.
pub async fn run_scrape_once<R, S>(
    repo: Arc<R>,
    source: Arc<S>,
    context: ScrapeContext,
) -> ScrapeReport
where
    R: CategoryReader + VisaTypeReader + VisaTypeWriter + ScrapeLogWriter + Send + Sync + 'static,
    S: ScrapeSource + Send + Sync + 'static,
{
    let worker_repo = Arc::clone(&repo);
    let handle = tokio::task::spawn_blocking(move || {
        run_scrape(worker_repo.as_ref(), source.as_ref(), &context)
    });

    match handle.await {
        Ok(report) => report,
        Err(e) => {
            let error = ServiceError::Worker(e.to_string());
            record_failure(repo.as_ref(), SCRAPER_ENTITY, &error);
            ScrapeReport {
                error: Some(error.to_string()),
                ..ScrapeReport::default()
            }
        }
    }
}
