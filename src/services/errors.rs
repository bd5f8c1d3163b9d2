use thiserror::Error;

use crate::oracle::OracleError;
use crate::repository::errors::RepositoryError;
use crate::scrape::ScrapeError;

/// Error type shared by the synchronization services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    /// A value coming from the oracle or the source violated a domain constraint.
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    /// A category referenced by the mapping table is missing from the store.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// Rendering the audit log export failed.
    #[error("failed to render audit log: {0}")]
    Export(String),
    /// The blocking worker thread died before reporting back.
    #[error("worker task failed: {0}")]
    Worker(String),
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
