use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory};
use crate::domain::scrape_log::{NewScrapeLog, ScrapeLog};
use crate::domain::sub_category::{SubCategory, SubCategoryChanges};
use crate::domain::types::{
    CategoryId, CategoryName, ScrapeAction, SubCategoryStatus, VisaTypeName,
};
use crate::domain::visa_type::{NewVisaType, VisaType, VisaTypeList};
use crate::repository::errors::RepositoryResult;

pub mod category;
pub mod errors;
pub mod scrape_log;
pub mod sub_category;
#[cfg(test)]
pub mod test;
pub mod visa_type;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be shared with blocking worker threads.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Page selection for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

/// Query parameters for reading the scrape log, newest entries first.
#[derive(Debug, Clone, Default)]
pub struct ScrapeLogListQuery {
    /// Restrict to one action tag.
    pub action: Option<ScrapeAction>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl ScrapeLogListQuery {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn action(mut self, action: ScrapeAction) -> Self {
        self.action = Some(action);
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// List every category ordered by name.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// Retrieve a category by its exact name.
    fn get_category_by_name(&self, name: &CategoryName) -> RepositoryResult<Option<Category>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<usize>;
    /// Overwrite the visa type list of a category and touch its timestamp.
    fn update_visa_types(&self, id: CategoryId, visa_types: &VisaTypeList)
    -> RepositoryResult<usize>;
}

/// Read-only operations for sub-category entities.
pub trait SubCategoryReader {
    /// List all sub-categories of a category regardless of status.
    fn list_sub_categories(&self, category_id: CategoryId) -> RepositoryResult<Vec<SubCategory>>;
    /// List sub-categories of a category that currently carry `status`.
    fn list_sub_categories_by_status(
        &self,
        category_id: CategoryId,
        status: SubCategoryStatus,
    ) -> RepositoryResult<Vec<SubCategory>>;
}

/// Write operations for sub-category entities.
pub trait SubCategoryWriter {
    /// Insert added rows, flip removed rows and append the accompanying audit
    /// entries in one transaction.
    fn apply_sub_category_changes(&self, changes: &SubCategoryChanges) -> RepositoryResult<usize>;
}

/// Read-only operations for scraped visa types.
pub trait VisaTypeReader {
    /// Retrieve a visa type by its exact name.
    fn get_visa_type_by_name(&self, name: &VisaTypeName) -> RepositoryResult<Option<VisaType>>;
}

/// Write operations for scraped visa types.
pub trait VisaTypeWriter {
    /// Persist a new visa type.
    fn create_visa_type(&self, visa_type: &NewVisaType) -> RepositoryResult<usize>;
}

/// Read access to the audit log.
pub trait ScrapeLogReader {
    /// List entries matching the query together with the unpaginated total.
    fn list_scrape_logs(
        &self,
        query: ScrapeLogListQuery,
    ) -> RepositoryResult<(usize, Vec<ScrapeLog>)>;
}

/// Append-only access to the audit log.
pub trait ScrapeLogWriter {
    /// Append entries in order.
    fn append_scrape_logs(&self, entries: &[NewScrapeLog]) -> RepositoryResult<usize>;
}
