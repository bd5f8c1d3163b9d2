//! Scrape source reading visa types out of an HTML table.

use scraper::{ElementRef, Html, Selector};

use crate::domain::types::SourceUrl;
use crate::models::config::ScraperConfig;
use crate::scrape::{RawVisaRow, ScrapeError, ScrapeResult, ScrapeSource};

/// Fetches a page over HTTP and reads the first two cells of every row
/// matched by the row selector as name and description.
pub struct HtmlTableSource {
    agent: ureq::Agent,
    url: SourceUrl,
    row_selector: String,
}

impl HtmlTableSource {
    pub fn new(url: SourceUrl, config: &ScraperConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout()).build();
        Self {
            agent,
            url,
            row_selector: config.row_selector.clone(),
        }
    }

    fn fetch_page(&self) -> ScrapeResult<String> {
        let url = self.url.as_str();
        match self.agent.get(url).call() {
            Ok(response) => response.into_string().map_err(|e| ScrapeError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(ureq::Error::Status(status, _)) => Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            }),
            Err(ureq::Error::Transport(transport)) => Err(ScrapeError::Fetch {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }
}

impl ScrapeSource for HtmlTableSource {
    fn fetch_rows(&self) -> ScrapeResult<Vec<RawVisaRow>> {
        let page = self.fetch_page()?;
        parse_table_rows(&page, &self.row_selector)
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<Vec<_>>().join(" ")
}

/// Extract rows from `html`. Rows without a data cell (header rows) are skipped.
pub fn parse_table_rows(html: &str, row_selector: &str) -> ScrapeResult<Vec<RawVisaRow>> {
    let rows = Selector::parse(row_selector)
        .map_err(|e| ScrapeError::Parse(format!("invalid row selector {row_selector:?}: {e}")))?;
    let cells = Selector::parse("td")
        .map_err(|e| ScrapeError::Parse(format!("invalid cell selector: {e}")))?;

    let document = Html::parse_document(html);
    let parsed = document
        .select(&rows)
        .filter_map(|row| {
            let mut row_cells = row.select(&cells);
            let name = cell_text(row_cells.next()?);
            let description = row_cells.next().map(cell_text).unwrap_or_default();
            Some(RawVisaRow { name, description })
        })
        .collect();

    Ok(parsed)
}
