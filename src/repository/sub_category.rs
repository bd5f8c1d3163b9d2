use chrono::Utc;
use diesel::prelude::*;

use crate::domain::sub_category::{SubCategory, SubCategoryChanges};
use crate::domain::types::{CategoryId, SubCategoryStatus};
use crate::models::scrape_log::NewScrapeLog as DbNewScrapeLog;
use crate::models::sub_category::{
    NewSubCategory as DbNewSubCategory, SubCategory as DbSubCategory,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, SubCategoryReader, SubCategoryWriter};

impl SubCategoryReader for DieselRepository {
    fn list_sub_categories(&self, category_id: CategoryId) -> RepositoryResult<Vec<SubCategory>> {
        use crate::schema::sub_categories;

        let mut conn = self.conn()?;

        let results = sub_categories::table
            .filter(sub_categories::category_id.eq(category_id.get()))
            .order(sub_categories::id.asc())
            .load::<DbSubCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<SubCategory>, _>>()?;

        Ok(results)
    }

    fn list_sub_categories_by_status(
        &self,
        category_id: CategoryId,
        status: SubCategoryStatus,
    ) -> RepositoryResult<Vec<SubCategory>> {
        use crate::schema::sub_categories;

        let mut conn = self.conn()?;

        let results = sub_categories::table
            .filter(sub_categories::category_id.eq(category_id.get()))
            .filter(sub_categories::status.eq(status.as_str()))
            .order(sub_categories::name.asc())
            .load::<DbSubCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<SubCategory>, _>>()?;

        Ok(results)
    }
}

impl SubCategoryWriter for DieselRepository {
    fn apply_sub_category_changes(&self, changes: &SubCategoryChanges) -> RepositoryResult<usize> {
        use crate::schema::{scrape_logs, sub_categories};

        let mut conn = self.conn()?;
        let new_rows: Vec<DbNewSubCategory> = changes.added.iter().map(Into::into).collect();
        let removed_ids: Vec<i32> = changes.removed.iter().map(|id| id.get()).collect();
        let log_rows: Vec<DbNewScrapeLog> = changes.log_entries.iter().map(Into::into).collect();
        let now = Utc::now().naive_utc();

        let affected = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let mut affected = 0;

            if !new_rows.is_empty() {
                affected += diesel::insert_into(sub_categories::table)
                    .values(&new_rows)
                    .execute(conn)?;
            }

            if !removed_ids.is_empty() {
                affected += diesel::update(
                    sub_categories::table
                        .filter(sub_categories::category_id.eq(changes.category_id.get()))
                        .filter(sub_categories::id.eq_any(removed_ids.clone())),
                )
                .set((
                    sub_categories::status.eq(SubCategoryStatus::Removed.as_str()),
                    sub_categories::updated_at.eq(now),
                ))
                .execute(conn)?;
            }

            if !log_rows.is_empty() {
                diesel::insert_into(scrape_logs::table)
                    .values(&log_rows)
                    .execute(conn)?;
            }

            Ok(affected)
        })?;

        Ok(affected)
    }
}
