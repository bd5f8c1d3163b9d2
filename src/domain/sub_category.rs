use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::scrape_log::NewScrapeLog;
use crate::domain::types::{CategoryId, SubCategoryId, SubCategoryName, SubCategoryStatus};

/// Sub-category of a visa category as tracked by the synchronizer.
#[derive(Debug, Clone, Serialize)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub category_id: CategoryId,
    pub name: SubCategoryName,
    pub status: SubCategoryStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`SubCategory`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubCategory {
    pub category_id: CategoryId,
    pub name: SubCategoryName,
    pub status: SubCategoryStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Sub-category delta for one category, committed as a single unit together
/// with the audit entries describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubCategoryChanges {
    pub category_id: CategoryId,
    /// Rows to insert.
    pub added: Vec<NewSubCategory>,
    /// Rows to flip to [`SubCategoryStatus::Removed`].
    pub removed: Vec<SubCategoryId>,
    /// Audit entries appended in the same transaction.
    pub log_entries: Vec<NewScrapeLog>,
}

impl SubCategoryChanges {
    pub fn new(category_id: CategoryId) -> Self {
        Self {
            category_id,
            added: Vec::new(),
            removed: Vec::new(),
            log_entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
