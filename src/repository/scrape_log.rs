use diesel::prelude::*;

use crate::domain::scrape_log::{NewScrapeLog, ScrapeLog};
use crate::models::scrape_log::{NewScrapeLog as DbNewScrapeLog, ScrapeLog as DbScrapeLog};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, ScrapeLogListQuery, ScrapeLogReader, ScrapeLogWriter};

impl ScrapeLogReader for DieselRepository {
    fn list_scrape_logs(
        &self,
        query: ScrapeLogListQuery,
    ) -> RepositoryResult<(usize, Vec<ScrapeLog>)> {
        use crate::schema::scrape_logs;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = scrape_logs::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(action) = query.action {
                items = items.filter(scrape_logs::action.eq(action.as_str()));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let items = items
            .order(scrape_logs::id.desc())
            .load::<DbScrapeLog>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<ScrapeLog>, _>>()?;

        Ok((total, items))
    }
}

impl ScrapeLogWriter for DieselRepository {
    fn append_scrape_logs(&self, entries: &[NewScrapeLog]) -> RepositoryResult<usize> {
        use crate::schema::scrape_logs;

        if entries.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let rows: Vec<DbNewScrapeLog> = entries.iter().map(Into::into).collect();

        let affected = diesel::insert_into(scrape_logs::table)
            .values(&rows)
            .execute(&mut conn)?;

        Ok(affected)
    }
}
