use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime};

use crate::domain::category::{Category, NewCategory};
use crate::domain::scrape_log::{NewScrapeLog, ScrapeLog};
use crate::domain::sub_category::{SubCategory, SubCategoryChanges};
use crate::domain::types::{
    CategoryId, CategoryName, ScrapeAction, ScrapeLogId, SubCategoryId, SubCategoryName,
    SubCategoryStatus, VisaTypeId, VisaTypeName,
};
use crate::domain::visa_type::{NewVisaType, VisaType, VisaTypeList};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CategoryReader, CategoryWriter, ScrapeLogListQuery, ScrapeLogReader, ScrapeLogWriter,
    SubCategoryReader, SubCategoryWriter, VisaTypeReader, VisaTypeWriter,
};

#[derive(Default)]
struct State {
    categories: Vec<Category>,
    sub_categories: Vec<SubCategory>,
    visa_types: Vec<VisaType>,
    logs: Vec<ScrapeLog>,
    visa_type_writes: usize,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simple in-memory repository used for unit tests.
#[derive(Default)]
pub struct TestRepository {
    state: Mutex<State>,
}

pub fn epoch() -> NaiveDateTime {
    DateTime::from_timestamp(0, 0).unwrap().naive_utc()
}

impl TestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a category with an initial visa type list and return its id.
    pub fn add_category(&self, name: &str, visa_types: &[&str]) -> CategoryId {
        let mut state = self.lock();
        let id = CategoryId::new(state.next_id()).unwrap();
        state.categories.push(Category {
            id,
            name: CategoryName::new(name).unwrap(),
            visa_types_json: Some(VisaTypeList::new(visa_types).to_json().unwrap()),
            updated_at: epoch(),
        });
        state.categories.sort_by(|a, b| a.name.cmp(&b.name));
        id
    }

    /// Seed a sub-category row.
    pub fn add_sub_category(&self, category_id: CategoryId, name: &str, status: SubCategoryStatus) {
        let mut state = self.lock();
        let id = SubCategoryId::new(state.next_id()).unwrap();
        state.sub_categories.push(SubCategory {
            id,
            category_id,
            name: SubCategoryName::new(name).unwrap(),
            status,
            created_at: epoch(),
            updated_at: epoch(),
        });
    }

    pub fn category(&self, name: &str) -> Category {
        self.lock()
            .categories
            .iter()
            .find(|c| c.name.as_str() == name)
            .cloned()
            .unwrap()
    }

    pub fn sub_categories(&self, category_id: CategoryId) -> Vec<SubCategory> {
        self.lock()
            .sub_categories
            .iter()
            .filter(|s| s.category_id == category_id)
            .cloned()
            .collect()
    }

    pub fn sub_category_status(
        &self,
        category_id: CategoryId,
        name: &str,
    ) -> Option<SubCategoryStatus> {
        self.sub_categories(category_id)
            .into_iter()
            .find(|s| s.name.as_str() == name)
            .map(|s| s.status)
    }

    /// Overwrite the stored visa type column of a category verbatim.
    pub fn set_raw_visa_types(&self, name: &str, raw: &str) {
        let mut state = self.lock();
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.name.as_str() == name)
            .unwrap();
        category.visa_types_json = Some(raw.to_string());
    }

    pub fn visa_types(&self) -> Vec<VisaType> {
        self.lock().visa_types.clone()
    }

    /// Every audit entry in insertion order.
    pub fn logs(&self) -> Vec<ScrapeLog> {
        self.lock().logs.clone()
    }

    pub fn logs_with_action(&self, action: ScrapeAction) -> Vec<ScrapeLog> {
        self.logs()
            .into_iter()
            .filter(|entry| entry.action == action)
            .collect()
    }

    /// Number of `update_visa_types` calls received.
    pub fn visa_type_writes(&self) -> usize {
        self.lock().visa_type_writes
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

impl CategoryReader for TestRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self.lock().categories.clone())
    }

    fn get_category_by_name(&self, name: &CategoryName) -> RepositoryResult<Option<Category>> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| &c.name == name)
            .cloned())
    }
}

impl CategoryWriter for TestRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<usize> {
        let mut state = self.lock();
        if state.categories.iter().any(|c| c.name == category.name) {
            return Err(RepositoryError::ValidationError(format!(
                "duplicate category {}",
                category.name
            )));
        }
        let id = CategoryId::new(state.next_id())?;
        state.categories.push(Category {
            id,
            name: category.name.clone(),
            visa_types_json: None,
            updated_at: category.updated_at,
        });
        state.categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(1)
    }

    fn update_visa_types(
        &self,
        id: CategoryId,
        visa_types: &VisaTypeList,
    ) -> RepositoryResult<usize> {
        let mut state = self.lock();
        state.visa_type_writes += 1;
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        category.visa_types_json = Some(visa_types.to_json()?);
        category.updated_at = chrono::Utc::now().naive_utc();
        Ok(1)
    }
}

impl SubCategoryReader for TestRepository {
    fn list_sub_categories(&self, category_id: CategoryId) -> RepositoryResult<Vec<SubCategory>> {
        Ok(self.sub_categories(category_id))
    }

    fn list_sub_categories_by_status(
        &self,
        category_id: CategoryId,
        status: SubCategoryStatus,
    ) -> RepositoryResult<Vec<SubCategory>> {
        let mut items = self.sub_categories(category_id);
        items.retain(|s| s.status == status);
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }
}

impl SubCategoryWriter for TestRepository {
    fn apply_sub_category_changes(&self, changes: &SubCategoryChanges) -> RepositoryResult<usize> {
        let mut state = self.lock();
        let mut affected = 0;
        for added in &changes.added {
            let id = SubCategoryId::new(state.next_id())?;
            state.sub_categories.push(SubCategory {
                id,
                category_id: added.category_id,
                name: added.name.clone(),
                status: added.status,
                created_at: added.created_at,
                updated_at: added.updated_at,
            });
            affected += 1;
        }
        for row in state
            .sub_categories
            .iter_mut()
            .filter(|s| s.category_id == changes.category_id && changes.removed.contains(&s.id))
        {
            row.status = SubCategoryStatus::Removed;
            row.updated_at = chrono::Utc::now().naive_utc();
            affected += 1;
        }
        for entry in &changes.log_entries {
            let id = ScrapeLogId::new(state.next_id())?;
            state.logs.push(ScrapeLog {
                id,
                timestamp: entry.timestamp,
                action: entry.action,
                entity: entry.entity.clone(),
                notes: entry.notes.clone(),
            });
        }
        Ok(affected)
    }
}

impl VisaTypeReader for TestRepository {
    fn get_visa_type_by_name(&self, name: &VisaTypeName) -> RepositoryResult<Option<VisaType>> {
        Ok(self
            .lock()
            .visa_types
            .iter()
            .find(|v| &v.name == name)
            .cloned())
    }
}

impl VisaTypeWriter for TestRepository {
    fn create_visa_type(&self, visa_type: &NewVisaType) -> RepositoryResult<usize> {
        let mut state = self.lock();
        let id = VisaTypeId::new(state.next_id())?;
        state.visa_types.push(VisaType {
            id,
            category_id: visa_type.category_id,
            name: visa_type.name.clone(),
            description: visa_type.description.clone(),
            created_at: visa_type.created_at,
        });
        Ok(1)
    }
}

impl ScrapeLogReader for TestRepository {
    fn list_scrape_logs(
        &self,
        query: ScrapeLogListQuery,
    ) -> RepositoryResult<(usize, Vec<ScrapeLog>)> {
        let mut items = self.logs();
        items.reverse();
        if let Some(action) = query.action {
            items.retain(|entry| entry.action == action);
        }
        let total = items.len();
        if let Some(pagination) = query.pagination {
            let offset = (pagination.page.max(1) - 1) * pagination.per_page;
            items = items
                .into_iter()
                .skip(offset)
                .take(pagination.per_page)
                .collect();
        }
        Ok((total, items))
    }
}

impl ScrapeLogWriter for TestRepository {
    fn append_scrape_logs(&self, entries: &[NewScrapeLog]) -> RepositoryResult<usize> {
        let mut state = self.lock();
        for entry in entries {
            let id = ScrapeLogId::new(state.next_id())?;
            state.logs.push(ScrapeLog {
                id,
                timestamp: entry.timestamp,
                action: entry.action,
                entity: entry.entity.clone(),
                notes: entry.notes.clone(),
            });
        }
        Ok(entries.len())
    }
}
