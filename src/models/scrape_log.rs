use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::scrape_log::{NewScrapeLog as DomainNewScrapeLog, ScrapeLog as DomainScrapeLog};
use crate::domain::types::{ScrapeAction, TypeConstraintError};

/// Diesel model representing the append-only `scrape_logs` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::scrape_logs)]
pub struct ScrapeLog {
    pub id: i32,
    pub timestamp: NaiveDateTime,
    pub action: String,
    pub entity: String,
    pub notes: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::scrape_logs)]
pub struct NewScrapeLog {
    pub timestamp: NaiveDateTime,
    pub action: String,
    pub entity: String,
    pub notes: String,
}

impl TryFrom<ScrapeLog> for DomainScrapeLog {
    type Error = TypeConstraintError;

    fn try_from(entry: ScrapeLog) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entry.id.try_into()?,
            timestamp: entry.timestamp,
            action: ScrapeAction::try_from(entry.action)?,
            entity: entry.entity,
            notes: entry.notes,
        })
    }
}

impl From<&DomainNewScrapeLog> for NewScrapeLog {
    fn from(entry: &DomainNewScrapeLog) -> Self {
        Self {
            timestamp: entry.timestamp,
            action: entry.action.as_str().to_string(),
            entity: entry.entity.clone(),
            notes: entry.notes.clone(),
        }
    }
}
