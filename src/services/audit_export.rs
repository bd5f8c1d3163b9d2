use crate::domain::scrape_log::ScrapeLog;
use crate::repository::{ScrapeLogListQuery, ScrapeLogReader};

use super::{ServiceError, ServiceResult};

const HEADERS: [&str; 5] = ["id", "timestamp", "action", "entity", "notes"];

/// Render audit entries as CSV, one row per entry in the given order.
pub fn render_scrape_log_csv(entries: &[ScrapeLog]) -> ServiceResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record(HEADERS)
        .map_err(|e| ServiceError::Export(e.to_string()))?;
    for entry in entries {
        let row = [
            entry.id.to_string(),
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.action.to_string(),
            escape_csv_cell(&entry.entity),
            escape_csv_cell(&entry.notes),
        ];
        writer
            .write_record(&row)
            .map_err(|e| ServiceError::Export(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ServiceError::Export(e.to_string()))
}

/// Read the audit log with `query` and render it as CSV.
pub fn export_scrape_log<R>(repo: &R, query: ScrapeLogListQuery) -> ServiceResult<Vec<u8>>
where
    R: ScrapeLogReader + ?Sized,
{
    let (total, entries) = repo.list_scrape_logs(query)?;
    log::info!("Exporting {} of {total} audit entries", entries.len());
    render_scrape_log_csv(&entries)
}

/// Prefix cells a spreadsheet would evaluate as a formula.
fn escape_csv_cell(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{value}"),
        _ => value.to_string(),
    }
}
