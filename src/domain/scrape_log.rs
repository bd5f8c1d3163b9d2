use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::domain::types::{ScrapeAction, ScrapeLogId};

/// Immutable audit record written by the synchronizer and the scrape bot.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeLog {
    pub id: ScrapeLogId,
    pub timestamp: NaiveDateTime,
    pub action: ScrapeAction,
    /// Display name of the affected entity (category, sub-category, visa type).
    pub entity: String,
    pub notes: String,
}

/// Data required to append a [`ScrapeLog`] entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScrapeLog {
    pub timestamp: NaiveDateTime,
    pub action: ScrapeAction,
    pub entity: String,
    pub notes: String,
}

impl NewScrapeLog {
    /// Build an entry stamped with the current UTC time.
    pub fn now(action: ScrapeAction, entity: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().naive_utc(),
            action,
            entity: entity.into(),
            notes: notes.into(),
        }
    }
}
