//! Sources of raw visa type rows for the scrape-and-upsert bot.

use thiserror::Error;

pub mod html;

pub use html::HtmlTableSource;

/// A visa type as read from the source, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVisaRow {
    pub name: String,
    pub description: String,
}

impl RawVisaRow {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to parse page: {0}")]
    Parse(String),
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Returns (name, description) pairs from a fixed external page.
pub trait ScrapeSource {
    fn fetch_rows(&self) -> ScrapeResult<Vec<RawVisaRow>>;
}
