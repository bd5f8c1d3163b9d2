//! Reconciliation of the visa taxonomy against the knowledge oracle.
//!
//! Every category goes through the same cycle: fetch the oracle's
//! sub-categories, add new ones that validate, remove missing ones only when a
//! second validation confirms they are gone, then refresh the category's visa
//! type list. Each decision is written to the scrape log.
//!
//! The oracle is treated as probabilistic. A single answer is enough to add a
//! validated sub-category but never enough to remove one.

use std::collections::HashSet;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::domain::category::Category;
use crate::domain::scrape_log::NewScrapeLog;
use crate::domain::sub_category::{NewSubCategory, SubCategoryChanges};
use crate::domain::types::{ScrapeAction, SubCategoryName, SubCategoryStatus, fold_name};
use crate::domain::visa_type::VisaTypeList;
use crate::models::config::FailurePolicy;
use crate::oracle::KnowledgeOracle;
use crate::repository::{
    CategoryReader, CategoryWriter, ScrapeLogWriter, SubCategoryReader, SubCategoryWriter,
};

use super::ServiceResult;

/// Options for one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub failure_policy: FailurePolicy,
}

/// Counters describing what a pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub categories_processed: usize,
    pub categories_failed: usize,
    pub sub_categories_added: usize,
    pub sub_categories_removed: usize,
    /// Sub-categories the oracle dropped but still validated.
    pub sub_categories_kept: usize,
    pub visa_types_updated: usize,
    pub visa_types_skipped: usize,
    /// The pass stopped early because cancellation was requested.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct CategoryOutcome {
    added: usize,
    removed: usize,
    kept: usize,
    visa_types_updated: bool,
}

impl SyncReport {
    fn record(&mut self, outcome: CategoryOutcome) {
        self.categories_processed += 1;
        self.sub_categories_added += outcome.added;
        self.sub_categories_removed += outcome.removed;
        self.sub_categories_kept += outcome.kept;
        if outcome.visa_types_updated {
            self.visa_types_updated += 1;
        } else {
            self.visa_types_skipped += 1;
        }
    }
}

/// Run one synchronization pass over every stored category.
///
/// Categories are processed sequentially in store order. Cancellation is
/// checked before each category; a category already in progress completes.
/// With [`FailurePolicy::FailFast`] the first failing category aborts the pass
/// and its error is returned. With [`FailurePolicy::Isolate`] the failure is
/// recorded as an `Error` entry naming the category and the pass continues.
pub fn synchronize<R, O>(
    repo: &R,
    oracle: &O,
    options: &SyncOptions,
    cancel: &CancellationToken,
) -> ServiceResult<SyncReport>
where
    R: CategoryReader + CategoryWriter + SubCategoryReader + SubCategoryWriter + ScrapeLogWriter,
    O: KnowledgeOracle + ?Sized,
{
    let categories = repo.list_categories()?;
    let mut report = SyncReport::default();

    for category in &categories {
        if cancel.is_cancelled() {
            log::info!(
                "Synchronization cancelled before category {}",
                category.name
            );
            report.cancelled = true;
            break;
        }

        match sync_category(repo, oracle, category) {
            Ok(outcome) => report.record(outcome),
            Err(e) => match options.failure_policy {
                FailurePolicy::FailFast => return Err(e),
                FailurePolicy::Isolate => {
                    log::error!("Failed to synchronize category {}: {e}", category.name);
                    report.categories_failed += 1;
                    repo.append_scrape_logs(&[NewScrapeLog::now(
                        ScrapeAction::Error,
                        category.name.as_str(),
                        e.to_string(),
                    )])?;
                }
            },
        }
    }

    log::info!(
        "Synchronized {} categories ({} failed): +{} / -{} sub-categories, {} visa lists updated, {} unchanged",
        report.categories_processed,
        report.categories_failed,
        report.sub_categories_added,
        report.sub_categories_removed,
        report.visa_types_updated,
        report.visa_types_skipped,
    );

    Ok(report)
}

fn sync_category<R, O>(repo: &R, oracle: &O, category: &Category) -> ServiceResult<CategoryOutcome>
where
    R: CategoryWriter + SubCategoryReader + SubCategoryWriter + ScrapeLogWriter,
    O: KnowledgeOracle + ?Sized,
{
    let mut outcome = CategoryOutcome::default();

    let latest = oracle.sub_categories(&category.name)?;
    let latest_keys: HashSet<String> = latest.iter().map(|name| fold_name(name)).collect();

    let current = repo.list_sub_categories(category.id)?;
    let mut known_keys: HashSet<String> = current.iter().map(|s| s.name.folded()).collect();

    let now = Utc::now().naive_utc();
    let mut changes = SubCategoryChanges::new(category.id);

    for name in &latest {
        // Inserting the key also collapses duplicates within one answer.
        if name.trim().is_empty() || !known_keys.insert(fold_name(name)) {
            continue;
        }
        let name = SubCategoryName::new(name.as_str())?;
        if oracle.validate_sub_category(&category.name, &name)? {
            log::info!("Adding sub-category {name} to {}", category.name);
            changes.log_entries.push(NewScrapeLog::now(
                ScrapeAction::SubCategoryAdded,
                name.as_str(),
                format!("Validated by Bruce for category {}", category.name),
            ));
            changes.added.push(NewSubCategory {
                category_id: category.id,
                name,
                status: SubCategoryStatus::Validated,
                created_at: now,
                updated_at: now,
            });
            outcome.added += 1;
        } else {
            log::debug!(
                "Discarding sub-category candidate {name} for {}: rejected by Bruce",
                category.name
            );
        }
    }

    let missing = current.iter().filter(|s| {
        s.status == SubCategoryStatus::Validated && !latest_keys.contains(&s.name.folded())
    });
    for sub_category in missing {
        if oracle.validate_sub_category(&category.name, &sub_category.name)? {
            log::debug!(
                "Keeping sub-category {} of {}: omitted by Bruce but still valid",
                sub_category.name,
                category.name
            );
            outcome.kept += 1;
        } else {
            log::info!(
                "Removing sub-category {} from {}",
                sub_category.name,
                category.name
            );
            changes.log_entries.push(NewScrapeLog::now(
                ScrapeAction::SubCategoryRemoved,
                sub_category.name.as_str(),
                format!("Invalidated by Bruce for category {}", category.name),
            ));
            changes.removed.push(sub_category.id);
            outcome.removed += 1;
        }
    }

    if !changes.is_empty() {
        repo.apply_sub_category_changes(&changes)?;
    }

    let valid: Vec<SubCategoryName> = repo
        .list_sub_categories_by_status(category.id, SubCategoryStatus::Validated)?
        .into_iter()
        .map(|s| s.name)
        .collect();

    let fetched = VisaTypeList::new(oracle.visa_types(&category.name, &valid)?);

    if fetched == category.visa_types()? {
        repo.append_scrape_logs(&[NewScrapeLog::now(
            ScrapeAction::VisaTypesSkipped,
            category.name.as_str(),
            "No changes detected",
        )])?;
    } else {
        repo.update_visa_types(category.id, &fetched)?;
        repo.append_scrape_logs(&[NewScrapeLog::now(
            ScrapeAction::VisaTypesUpdated,
            category.name.as_str(),
            format!("Updated by Bruce: {}", fetched.joined()),
        )])?;
        outcome.visa_types_updated = true;
    }

    Ok(outcome)
}
