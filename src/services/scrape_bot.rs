//! One-shot bot that scrapes visa types from a public page and upserts them
//! by name. No validation round-trip and no removals.

use std::collections::HashMap;

use chrono::Utc;

use crate::domain::scrape_log::NewScrapeLog;
use crate::domain::types::{
    CategoryId, CategoryName, ScrapeAction, TypeConstraintError, VisaTypeName, fold_name,
};
use crate::domain::visa_type::NewVisaType;
use crate::models::config::ScraperConfig;
use crate::repository::{CategoryReader, ScrapeLogWriter, VisaTypeReader, VisaTypeWriter};
use crate::scrape::ScrapeSource;
use crate::services::runner::record_failure;

use super::{ServiceError, ServiceResult};

/// Entity name used for run-level audit entries of the bot.
pub const SCRAPER_ENTITY: &str = "VisaScraper";

const BUILTIN_MAPPINGS: &[(&str, &str)] = &[
    ("B-1", "Visit"),
    ("B-2", "Visit"),
    ("C-1", "Visit"),
    ("ESTA", "Visit"),
    ("F-1", "Study"),
    ("F-2", "Study"),
    ("M-1", "Study"),
    ("J-1", "Study"),
    ("J-2", "Study"),
    ("H-1B", "Work"),
    ("H-1B1", "Work"),
    ("H-2A", "Work"),
    ("H-2B", "Work"),
    ("H-3", "Work"),
    ("L-1", "Work"),
    ("O-1", "Work"),
    ("P-1", "Work"),
    ("Q-1", "Work"),
    ("R-1", "Work"),
    ("TN", "Work"),
    ("E-3", "Work"),
    ("E-1", "Investment"),
    ("E-2", "Investment"),
    ("EB-5", "Investment"),
    ("EB-1", "Immigrate"),
    ("EB-2", "Immigrate"),
    ("EB-3", "Immigrate"),
    ("EB-4", "Immigrate"),
    ("DV", "Immigrate"),
    ("SB-1", "Immigrate"),
    ("IR", "Family"),
    ("CR", "Family"),
    ("K-1", "Family"),
    ("K-3", "Family"),
    ("F2A", "Family"),
    ("F2B", "Family"),
    ("Asylum", "Asylum"),
    ("Refugee", "Asylum"),
];

/// Lookup table from visa code prefix to category name.
#[derive(Debug, Clone)]
pub struct CategoryMappings {
    /// Folded prefixes, longest first.
    prefixes: Vec<(String, CategoryName)>,
    fallback: CategoryName,
}

impl CategoryMappings {
    pub fn new<I>(entries: I, fallback: CategoryName) -> Self
    where
        I: IntoIterator<Item = (String, CategoryName)>,
    {
        let mut prefixes: Vec<(String, CategoryName)> = entries
            .into_iter()
            .map(|(prefix, category)| (fold_name(&prefix), category))
            .filter(|(prefix, _)| !prefix.is_empty())
            .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { prefixes, fallback }
    }

    /// The built-in table of common U.S. visa codes.
    pub fn builtin(fallback: CategoryName) -> Result<Self, TypeConstraintError> {
        let entries = BUILTIN_MAPPINGS
            .iter()
            .map(|(prefix, category)| Ok((prefix.to_string(), CategoryName::new(*category)?)))
            .collect::<Result<Vec<_>, TypeConstraintError>>()?;
        Ok(Self::new(entries, fallback))
    }

    /// Table from settings, or the built-in one when none is configured.
    pub fn from_config(config: &ScraperConfig) -> Result<Self, TypeConstraintError> {
        let fallback = CategoryName::new(config.fallback_category.as_str())?;
        if config.category_mappings.is_empty() {
            return Self::builtin(fallback);
        }
        let entries = config
            .category_mappings
            .iter()
            .map(|(prefix, category)| Ok((prefix.clone(), CategoryName::new(category.as_str())?)))
            .collect::<Result<Vec<_>, TypeConstraintError>>()?;
        Ok(Self::new(entries, fallback))
    }

    pub fn fallback(&self) -> &CategoryName {
        &self.fallback
    }
}

/// Category for `visa_code`: the longest matching prefix, else the fallback.
///
/// A prefix matches when the code starts with it and the next character is
/// not a digit, so `E-1` does not claim `E-10` while `L-1` claims `L-1A`.
pub fn map_category<'a>(visa_code: &str, mappings: &'a CategoryMappings) -> &'a CategoryName {
    let code = fold_name(visa_code);
    mappings
        .prefixes
        .iter()
        .find(|(prefix, _)| {
            code.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.chars().next().is_none_or(|c| !c.is_ascii_digit()))
        })
        .map(|(_, category)| category)
        .unwrap_or(&mappings.fallback)
}

/// Inputs of one bot run.
#[derive(Debug, Clone)]
pub struct ScrapeContext {
    pub mappings: CategoryMappings,
}

/// Outcome of one bot run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub rows: usize,
    pub created: usize,
    pub skipped: usize,
    /// Message of the error that ended the run early.
    pub error: Option<String>,
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scrape the source and upsert every visa type by name.
///
/// Never fails: an error ends the run and is recorded as a single `Error`
/// entry. Rows handled before the error stay committed and counted.
pub fn run_scrape<R, S>(repo: &R, source: &S, context: &ScrapeContext) -> ScrapeReport
where
    R: CategoryReader + VisaTypeReader + VisaTypeWriter + ScrapeLogWriter,
    S: ScrapeSource + ?Sized,
{
    let mut report = ScrapeReport::default();
    if let Err(e) = scrape_and_upsert(repo, source, context, &mut report) {
        record_failure(repo, SCRAPER_ENTITY, &e);
        report.error = Some(e.to_string());
    }
    log::info!(
        "Visa scrape finished: {} rows, {} created, {} skipped",
        report.rows,
        report.created,
        report.skipped
    );
    report
}

fn scrape_and_upsert<R, S>(
    repo: &R,
    source: &S,
    context: &ScrapeContext,
    report: &mut ScrapeReport,
) -> ServiceResult<()>
where
    R: CategoryReader + VisaTypeReader + VisaTypeWriter + ScrapeLogWriter,
    S: ScrapeSource + ?Sized,
{
    let rows = source.fetch_rows()?;

    let category_ids: HashMap<String, CategoryId> = repo
        .list_categories()?
        .into_iter()
        .map(|category| (category.name.folded(), category.id))
        .collect();
    let fallback_id = category_ids
        .get(&context.mappings.fallback().folded())
        .copied()
        .ok_or_else(|| ServiceError::UnknownCategory(context.mappings.fallback().to_string()))?;

    for row in rows {
        let name = normalize_whitespace(&row.name);
        if name.is_empty() {
            log::debug!("Skipping scraped row without a name");
            continue;
        }
        report.rows += 1;

        let name = VisaTypeName::new(name)?;
        let category = map_category(&name, &context.mappings);
        let category_id = match category_ids.get(&category.folded()) {
            Some(id) => *id,
            None => {
                log::warn!("Category {category} for {name} is not stored; using fallback");
                fallback_id
            }
        };

        let entry = match repo.get_visa_type_by_name(&name)? {
            Some(_) => {
                report.skipped += 1;
                NewScrapeLog::now(ScrapeAction::Skipped, name.as_str(), "Already exists")
            }
            None => {
                repo.create_visa_type(&NewVisaType {
                    category_id,
                    name: name.clone(),
                    description: normalize_whitespace(&row.description),
                    created_at: Utc::now().naive_utc(),
                })?;
                report.created += 1;
                NewScrapeLog::now(
                    ScrapeAction::Created,
                    name.as_str(),
                    format!("Scraped into category {category}"),
                )
            }
        };
        repo.append_scrape_logs(&[entry])?;
    }

    Ok(())
}
